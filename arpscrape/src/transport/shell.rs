//! Shell adapter over any async byte stream.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::Shell;
use crate::error::{ChannelError, Result};

/// [`Shell`] backed by an `AsyncRead + AsyncWrite` stream.
///
/// The SSH session wraps its channel stream in this; tests wrap a scripted
/// mock stream.
#[derive(Debug)]
pub struct StreamShell<S> {
    stream: S,
}

impl<S> StreamShell<S> {
    /// Wrap a stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

impl<S> Shell for StreamShell<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.stream
            .write_all(data)
            .await
            .map_err(ChannelError::Io)?;
        self.stream.flush().await.map_err(ChannelError::Io)?;
        Ok(())
    }

    async fn recv(&mut self, max: usize) -> Result<Option<Vec<u8>>> {
        let mut chunk = vec![0u8; max];
        let n = self.stream.read(&mut chunk).await.map_err(ChannelError::Io)?;
        if n == 0 {
            return Ok(None);
        }
        chunk.truncate(n);
        Ok(Some(chunk))
    }
}
