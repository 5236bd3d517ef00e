//! Menu driver for the device console.
//!
//! The driver layer owns the session, runs the navigation script step by
//! step and hands back what each step captured.

mod builder;
mod capture;
mod menu;
mod script;

pub use builder::MenuDriverBuilder;
pub use capture::{Capture, MenuRun};
pub use menu::MenuDriver;
pub use script::{MenuScript, MenuState, MenuStep, ScriptBuilder, ScriptBuilderWithInput};
