//! # arpscrape
//!
//! Collect the ARP table from a pfSense console menu over SSH.
//!
//! The pfSense console does not drop into a shell on login; it shows a
//! numbered menu. arpscrape walks that menu to the shell, runs `arp -a`,
//! waits for the menu to come back and parses the captured table into
//! (hardware address, network address) records.
//!
//! ## Layers
//!
//! - [`transport`]: SSH session and interactive shell via russh
//! - [`channel`]: marker detection over the shell's byte stream
//! - [`driver`]: the linear menu script and the session lifecycle
//! - [`platform`]: device literals (markers, keystrokes, commands)
//! - [`extract`]: `arp -a` table parsing
//! - [`store`]: upsert-by-hardware-address persistence
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arpscrape::store::{JsonFileStore, RecordStore};
//! use arpscrape::{MenuDriverBuilder, extract};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), arpscrape::Error> {
//!     let mut driver = MenuDriverBuilder::new("192.168.1.1")
//!         .username("admin")
//!         .password("secret")
//!         .build()?;
//!
//!     let raw = driver.collect_raw_output().await?;
//!     let extraction = extract::parse(&raw);
//!
//!     let mut store = JsonFileStore::open("arp.json")?;
//!     store.upsert(&extraction.records)?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod extract;
pub mod platform;
pub mod store;
pub mod transport;

// Re-export main types for convenience
pub use channel::{CancelHandle, CancelToken, PromptMarker, PromptScanner, cancel_pair};
pub use driver::{Capture, MenuDriver, MenuDriverBuilder, MenuRun, MenuState};
pub use error::Error;
pub use extract::{AddressRecord, Extraction};
pub use platform::DeviceProfile;
pub use transport::{AuthMethod, SshConfig};
