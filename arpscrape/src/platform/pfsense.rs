//! pfSense console menu profile.
//!
//! The pfSense console opens on a numbered menu ending in
//! `Enter an option:`. Option 8 drops to a shell whose prompt contains the
//! firewall's hostname; leaving the shell returns to the menu.

use crate::platform::DeviceProfile;

/// Profile name.
pub const PLATFORM_NAME: &str = "pfsense";

/// Cue printed by the top-level console menu.
pub const MENU_PROMPT: &str = "Enter an option:";

/// Menu entry for the shell.
pub const SHELL_OPTION: &str = "8";

/// Shell marker used when none is configured.
pub const DEFAULT_SHELL_PROMPT: &str = "pfSense.nrb.com";

/// Create the pfSense profile; `shell_prompt` is usually the firewall's hostname.
pub fn profile(shell_prompt: impl Into<String>) -> DeviceProfile {
    DeviceProfile::new(PLATFORM_NAME, MENU_PROMPT, shell_prompt)
        .with_shell_option(SHELL_OPTION)
        .with_diagnostic_command("arp -a")
        .with_command_separator(" ; ")
        .with_exit_command("exit")
}
