//! Channel layer for prompt detection.
//!
//! This module turns the raw shell byte stream into "everything up to the
//! next marker" captures: literal markers, the accumulating buffer, the
//! deadline/cancel-bounded scanner and the observation sink for verbose mode.

mod buffer;
mod cancel;
mod marker;
mod scanner;
mod sink;

pub use buffer::PatternBuffer;
pub use cancel::{CancelHandle, CancelToken, cancel_pair};
pub use marker::PromptMarker;
pub use scanner::{DEFAULT_CHUNK_SIZE, PromptScanner, ScanConfig};
pub use sink::{CaptureSink, NullSink, OutputSink, StdoutSink};
