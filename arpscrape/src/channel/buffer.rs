//! Accumulating buffer with incremental marker search.
//!
//! Output from a single wait can be large (a full ARP table on a busy
//! segment), so each search only covers the bytes appended since the last
//! search plus enough overlap to catch a marker split across two reads.

use bytes::BytesMut;

use super::marker::PromptMarker;

/// Buffer for accumulating output and searching it for a marker.
#[derive(Debug)]
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: BytesMut,

    /// Bytes already covered by a previous search.
    scanned: usize,
}

impl PatternBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            scanned: 0,
        }
    }

    /// Append raw bytes as received.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Search the unscanned tail for `marker`.
    ///
    /// Returns the offset in the full buffer where the marker ends.
    pub fn find_new(&mut self, marker: &PromptMarker) -> Option<usize> {
        let overlap = marker.len().saturating_sub(1);
        let start = self.scanned.saturating_sub(overlap);
        self.scanned = self.buffer.len();
        marker
            .find_end(&self.buffer[start..])
            .map(|end| start + end)
    }

    /// Consume the buffer as text (lossy UTF-8; exact for ASCII).
    pub fn into_string(self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new()
    }
}
