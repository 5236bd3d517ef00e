//! SSH transport layer wrapping russh.
//!
//! This module provides the low-level session management: connection
//! setup, authentication, and the interactive shell the menu driver talks
//! through. The [`Connector`], [`Session`] and [`Shell`] traits are the seam
//! between the menu driver and the network; tests plug scripted streams in
//! through them.

pub mod config;
mod shell;
mod ssh;

use std::future::Future;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use shell::StreamShell;
pub use ssh::{SshConnector, SshSession, SshShell};

use crate::error::Result;

/// Interactive byte channel to the device.
pub trait Shell: Send {
    /// Write `data` to the device.
    fn send(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Block until at most `max` bytes arrive.
    ///
    /// Returns `None` once the remote side has closed the channel.
    fn recv(&mut self, max: usize) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;
}

/// An established connection to one host.
pub trait Session: Send {
    /// Shell type handed out by this session.
    type Shell: Shell;

    /// Open the interactive shell. Only one shell is handed out per session.
    fn shell(&mut self) -> impl Future<Output = Result<Self::Shell>> + Send;

    /// Tear the connection down.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens sessions from a configuration.
pub trait Connector: Send + Sync {
    /// Session type produced by this connector.
    type Session: Session;

    /// Connect and authenticate.
    fn open(&self, config: &SshConfig) -> impl Future<Output = Result<Self::Session>> + Send;
}
