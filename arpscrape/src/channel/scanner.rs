//! Prompt scanner: read until a marker shows up.

use std::time::Duration;

use log::{debug, trace};
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use super::cancel::CancelToken;
use super::marker::PromptMarker;
use super::sink::OutputSink;
use crate::error::{ChannelError, Result};
use crate::transport::Shell;

/// Bytes requested per read. Matches what the console emits in one burst.
pub const DEFAULT_CHUNK_SIZE: usize = 65_100;

/// Configuration for prompt waits.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum bytes per read.
    pub chunk_size: usize,

    /// How long one wait may take before the marker counts as missing.
    pub timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Blocks on a shell until a marker appears in the accumulated output.
///
/// Each [`wait_for`](Self::wait_for) starts with an empty accumulator and
/// returns everything read during that wait, including text that arrived
/// after the marker in the same chunk.
#[derive(Debug, Clone, Default)]
pub struct PromptScanner {
    config: ScanConfig,
    cancel: CancelToken,
}

impl PromptScanner {
    /// Create a scanner with the given configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::never(),
        }
    }

    /// Abort waits when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Read from `shell` until `marker` is present, feeding each chunk to `sink`.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::PromptNotObserved`] when the deadline passes first
    /// - [`ChannelError::Cancelled`] when the cancel token fires
    /// - [`ChannelError::Closed`] when the shell reaches end of stream
    pub async fn wait_for<S: Shell>(
        &mut self,
        shell: &mut S,
        marker: &PromptMarker,
        sink: &mut dyn OutputSink,
    ) -> Result<String> {
        let deadline = Instant::now() + self.config.timeout;
        let mut buffer = PatternBuffer::new();

        debug!("waiting for {:?}", marker.as_str());

        loop {
            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(ChannelError::Cancelled {
                        marker: marker.to_string(),
                    }
                    .into());
                }
                read = tokio::time::timeout_at(deadline, shell.recv(self.config.chunk_size)) => read,
            };

            let chunk = read.map_err(|_| ChannelError::PromptNotObserved {
                marker: marker.to_string(),
                timeout: self.config.timeout,
            })??;

            let Some(chunk) = chunk else {
                debug!(
                    "channel closed after {} bytes while waiting for {:?}",
                    buffer.len(),
                    marker.as_str()
                );
                return Err(ChannelError::Closed.into());
            };

            trace!("chunk: {} bytes, accumulated: {} bytes", chunk.len(), buffer.len());
            sink.observe(&String::from_utf8_lossy(&chunk));
            buffer.extend(&chunk);

            if buffer.find_new(marker).is_some() {
                debug!("matched {:?} after {} bytes", marker.as_str(), buffer.len());
                return Ok(buffer.into_string());
            }
        }
    }
}
