//! Error types for arpscrape.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::driver::MenuState;

/// Exit status for a failure while talking to the device.
pub const EXIT_SESSION_FAILURE: i32 = 3;

/// Exit status for a failure while persisting records.
pub const EXIT_STORE_FAILURE: i32 = 4;

/// Main error type for arpscrape operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Record persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// Process exit status for this error.
    ///
    /// Anything that went wrong before the records were extracted maps to
    /// [`EXIT_SESSION_FAILURE`], storage problems to [`EXIT_STORE_FAILURE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Store(_) => EXIT_STORE_FAILURE,
            Error::Transport(_) | Error::Channel(_) | Error::Driver(_) => EXIT_SESSION_FAILURE,
        }
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not present in known_hosts and strict checking is on
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key does not match the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (shell I/O, prompt detection).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The session's shell was already handed out
    #[error("Shell already taken for this session")]
    ShellAlreadyTaken,

    /// Marker never showed up before the deadline
    #[error("Prompt '{marker}' not observed within {timeout:?}")]
    PromptNotObserved { marker: String, timeout: Duration },

    /// Wait aborted through a cancel token
    #[error("Wait for prompt '{marker}' cancelled")]
    Cancelled { marker: String },

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// I/O error while reading from or writing to the shell
    #[error("Channel I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Driver layer errors (menu navigation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Invalid configuration in the driver builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A script step failed
    #[error("Step {step} failed in state {state}: {source}")]
    StepFailed {
        step: usize,
        state: MenuState,
        #[source]
        source: Box<Error>,
    },

    /// The script ended without capturing anything
    #[error("Menu script is empty")]
    EmptyScript,
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error on the backing file
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backing file holds something that is not a record list
    #[error("Corrupt store {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be encoded
    #[error("Failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type alias using arpscrape's Error.
pub type Result<T> = std::result::Result<T, Error>;
