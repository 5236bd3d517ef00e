//! Device profiles.
//!
//! A profile holds the literals that tie the menu driver to one console
//! layout: the markers it prints and the keystrokes that walk it to the
//! diagnostic command.

pub mod pfsense;
mod profile;

pub use profile::DeviceProfile;
