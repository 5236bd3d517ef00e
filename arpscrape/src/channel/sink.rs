//! Observation sinks for verbose output streaming.

use std::io::Write;
use std::sync::{Arc, Mutex};

use log::trace;

/// Receives every chunk read from the device, as it arrives.
pub trait OutputSink: Send {
    /// Observe one decoded chunk.
    fn observe(&mut self, chunk: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn observe(&mut self, _chunk: &str) {}
}

/// Echoes chunks to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn observe(&mut self, chunk: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(chunk.as_bytes()).and_then(|()| out.flush()) {
            trace!("stdout write failed: {}", e);
        }
    }
}

/// Keeps chunks in memory; clones share the same storage.
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    chunks: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    /// Create an empty capture sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks observed so far.
    pub fn chunks(&self) -> Vec<String> {
        self.chunks
            .lock()
            .map(|chunks| chunks.clone())
            .unwrap_or_default()
    }
}

impl OutputSink for CaptureSink {
    fn observe(&mut self, chunk: &str) {
        if let Ok(mut chunks) = self.chunks.lock() {
            chunks.push(chunk.to_string());
        }
    }
}
