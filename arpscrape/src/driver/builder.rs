//! Builder for creating menu drivers.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::menu::MenuDriver;
use crate::channel::{CancelToken, DEFAULT_CHUNK_SIZE, ScanConfig};
use crate::error::{DriverError, Result};
use crate::platform::{DeviceProfile, pfsense};
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::transport::{Connector, SshConnector};

/// Builder for constructing menu drivers.
///
/// # Example
///
/// ```rust,no_run
/// use arpscrape::driver::MenuDriverBuilder;
///
/// # async fn example() -> Result<(), arpscrape::Error> {
/// let mut driver = MenuDriverBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .shell_marker("fw.example.org")
///     .build()?;
///
/// let raw = driver.collect_raw_output().await?;
/// # Ok(())
/// # }
/// ```
pub struct MenuDriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    timeout: Duration,
    chunk_size: usize,
    shell_marker: String,
    profile: Option<DeviceProfile>,
    verbose: bool,
    cancel: Option<CancelToken>,
}

impl MenuDriverBuilder {
    /// Create a new driver builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            timeout: Duration::from_secs(30),
            chunk_size: DEFAULT_CHUNK_SIZE,
            shell_marker: pfsense::DEFAULT_SHELL_PROMPT.to_string(),
            profile: None,
            verbose: false,
            cancel: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Set the authentication method directly.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    /// Set the host key verification mode (default: strict).
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a specific known_hosts file.
    pub fn known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Set the connection and per-prompt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum bytes per read.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the shell prompt marker used by the pfSense profile.
    pub fn shell_marker(mut self, marker: impl Into<String>) -> Self {
        self.shell_marker = marker.into();
        self
    }

    /// Use a custom device profile instead of pfSense.
    pub fn profile(mut self, profile: DeviceProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Stream received output to stdout.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Abort pending prompt waits when `token` is cancelled.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build a driver that connects over SSH.
    ///
    /// This does not connect; the session is opened by
    /// [`MenuDriver::collect_raw_output`].
    pub fn build(self) -> Result<MenuDriver<SshConnector>> {
        self.build_with(SshConnector)
    }

    /// Build a driver that opens sessions through `connector`.
    pub fn build_with<C: Connector>(self, connector: C) -> Result<MenuDriver<C>> {
        let username = self.username.ok_or_else(|| DriverError::InvalidConfig {
            message: "Username is required".to_string(),
        })?;

        if self.host.is_empty() {
            return Err(invalid("Host is required"));
        }
        if self.chunk_size == 0 {
            return Err(invalid("Chunk size must be positive"));
        }

        let profile = match self.profile {
            Some(profile) => profile,
            None => pfsense::profile(self.shell_marker),
        };
        if profile.menu_marker.is_empty() || profile.shell_marker.is_empty() {
            return Err(invalid("Prompt markers must not be empty"));
        }

        let ssh_config = SshConfig {
            port: self.port,
            auth: self.auth,
            timeout: self.timeout,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
            ..SshConfig::new(self.host, username)
        };

        let scan_config = ScanConfig {
            chunk_size: self.chunk_size,
            timeout: self.timeout,
        };

        let mut driver =
            MenuDriver::new(connector, ssh_config, profile, scan_config).with_verbose(self.verbose);
        if let Some(token) = self.cancel {
            driver = driver.with_cancel(token);
        }
        Ok(driver)
    }
}

fn invalid(message: &str) -> crate::Error {
    DriverError::InvalidConfig {
        message: message.to_string(),
    }
    .into()
}
