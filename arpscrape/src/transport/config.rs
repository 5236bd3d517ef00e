//! SSH connection configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    #[default]
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    AcceptNew,

    /// Accept all keys without checking. For testing and lab use only.
    Disabled,
}

/// SSH connection configuration.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Connection timeout.
    pub timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Config with the console defaults for `host`, authenticating as `username`.
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            auth: AuthMethod::None,
            timeout: Duration::from_secs(30),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication method for SSH connections.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// No authentication (for testing only).
    None,

    /// Password authentication.
    Password(SecretString),

    /// Private key authentication.
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}

/// Key file names tried, in order, when no explicit credential is given.
const DEFAULT_KEY_NAMES: [&str; 3] = ["id_ed25519", "id_ecdsa", "id_rsa"];

impl AuthMethod {
    /// First conventional private key present under `ssh_dir`.
    pub fn discover_key(ssh_dir: &Path) -> Option<Self> {
        DEFAULT_KEY_NAMES
            .iter()
            .map(|name| ssh_dir.join(name))
            .find(|path| path.is_file())
            .map(|path| AuthMethod::PrivateKey {
                path,
                passphrase: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SshConfig::new("192.168.1.1", "admin");
        assert_eq!(config.port, 22);
        assert_eq!(config.socket_addr(), "192.168.1.1:22");
        assert!(matches!(
            config.host_key_verification,
            HostKeyVerification::Strict
        ));
        assert!(matches!(config.auth, AuthMethod::None));
    }

    #[test]
    fn test_discover_key_in_empty_dir() {
        let dir = std::env::temp_dir().join(format!("arpscrape-keys-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert!(AuthMethod::discover_key(&dir).is_none());

        std::fs::write(dir.join("id_rsa"), b"not really a key").unwrap();
        match AuthMethod::discover_key(&dir) {
            Some(AuthMethod::PrivateKey { path, passphrase }) => {
                assert_eq!(path, dir.join("id_rsa"));
                assert!(passphrase.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
