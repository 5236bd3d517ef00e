//! Literal prompt markers.

use std::fmt;

use memchr::memmem::Finder;

/// A fixed substring whose appearance means the device reached a known state.
///
/// Markers are literal, not regexes; the device prints them verbatim.
#[derive(Clone)]
pub struct PromptMarker {
    text: String,
    finder: Finder<'static>,
}

impl PromptMarker {
    /// Create a marker from its literal text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let finder = Finder::new(text.as_bytes()).into_owned();
        Self { text, finder }
    }

    /// The literal text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the marker in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the marker is the empty string.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset where the first occurrence ends, if any.
    pub fn find_end(&self, haystack: &[u8]) -> Option<usize> {
        self.finder.find(haystack).map(|start| start + self.text.len())
    }

    /// Whether `haystack` contains the marker.
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.finder.find(haystack).is_some()
    }
}

impl fmt::Debug for PromptMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PromptMarker").field(&self.text).finish()
    }
}

impl fmt::Display for PromptMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq for PromptMarker {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for PromptMarker {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_end() {
        let marker = PromptMarker::new("Enter an option:");
        let data = b" 8) Shell\r\n\r\nEnter an option: ";
        assert_eq!(marker.find_end(data), Some(data.len() - 1));
        assert!(!marker.is_match(b"Enter an option"));
    }

    #[test]
    fn test_markers_are_distinct() {
        let menu = PromptMarker::new("Enter an option:");
        let shell = PromptMarker::new("pfSense.nrb.com");
        assert_ne!(menu, shell);
        assert!(!shell.is_match(b"Enter an option:"));
        assert!(shell.is_match(b"[2.4.5-RELEASE][root@pfSense.nrb.com]/root: "));
    }
}
