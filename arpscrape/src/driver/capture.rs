//! Captured output from script steps.

use std::time::Duration;

use super::script::MenuState;

/// Output captured by one script step.
#[derive(Debug, Clone)]
pub struct Capture {
    /// The line sent before waiting, if any.
    pub input: Option<String>,

    /// The marker that ended the wait.
    pub marker: String,

    /// State reached when the marker was seen.
    pub state: MenuState,

    /// Everything received during the wait, marker and trailer included.
    pub output: String,

    /// Time taken by the step.
    pub elapsed: Duration,
}

impl Capture {
    /// Create a capture.
    pub fn new(
        input: Option<String>,
        marker: impl Into<String>,
        state: MenuState,
        output: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            input,
            marker: marker.into(),
            state,
            output: output.into(),
            elapsed,
        }
    }
}

impl std::fmt::Display for Capture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output)
    }
}

/// Result of running a whole script.
#[derive(Debug, Clone)]
pub struct MenuRun {
    /// One capture per step, in order.
    pub captures: Vec<Capture>,

    /// Total time from connect to disconnect.
    pub elapsed: Duration,
}

impl MenuRun {
    /// Create a run result.
    pub fn new(captures: Vec<Capture>, elapsed: Duration) -> Self {
        Self { captures, elapsed }
    }

    /// Output of the last step.
    pub fn final_output(&self) -> Option<&str> {
        self.captures.last().map(|c| c.output.as_str())
    }

    /// Take the output of the last step.
    pub fn into_final_output(self) -> Option<String> {
        self.captures.into_iter().last().map(|c| c.output)
    }

    /// Lines sent during the run, in order.
    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.captures.iter().filter_map(|c| c.input.as_deref())
    }
}
