//! Device profile definition.

use crate::channel::PromptMarker;
use crate::driver::{MenuScript, MenuState};

/// Console literals for one device family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Profile name (e.g., "pfsense").
    pub name: String,

    /// Cue printed when the top-level menu waits for a selection.
    pub menu_marker: PromptMarker,

    /// Cue printed by the shell prompt.
    pub shell_marker: PromptMarker,

    /// Menu selection that opens the shell.
    pub shell_option: String,

    /// Command printing the address table.
    pub diagnostic_command: String,

    /// Joins the diagnostic command and the exit instruction on one line.
    pub command_separator: String,

    /// Leaves the shell and returns to the menu.
    pub exit_command: String,

    /// Appended to every line sent.
    pub line_terminator: String,
}

impl DeviceProfile {
    /// Create a profile with the given markers and conventional shell literals.
    pub fn new(
        name: impl Into<String>,
        menu_marker: impl Into<String>,
        shell_marker: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            menu_marker: PromptMarker::new(menu_marker),
            shell_marker: PromptMarker::new(shell_marker),
            shell_option: String::new(),
            diagnostic_command: "arp -a".to_string(),
            command_separator: " ; ".to_string(),
            exit_command: "exit".to_string(),
            line_terminator: "\n".to_string(),
        }
    }

    /// Set the menu selection that opens the shell.
    pub fn with_shell_option(mut self, option: impl Into<String>) -> Self {
        self.shell_option = option.into();
        self
    }

    /// Set the diagnostic command.
    pub fn with_diagnostic_command(mut self, command: impl Into<String>) -> Self {
        self.diagnostic_command = command.into();
        self
    }

    /// Set the command separator.
    pub fn with_command_separator(mut self, separator: impl Into<String>) -> Self {
        self.command_separator = separator.into();
        self
    }

    /// Set the exit instruction.
    pub fn with_exit_command(mut self, command: impl Into<String>) -> Self {
        self.exit_command = command.into();
        self
    }

    /// The line sent at the shell prompt: command, separator, exit.
    pub fn diagnostic_line(&self) -> String {
        format!(
            "{}{}{}",
            self.diagnostic_command, self.command_separator, self.exit_command
        )
    }

    /// The navigation script from login to the captured diagnostic output.
    pub fn script(&self) -> MenuScript {
        MenuScript::builder()
            .expect(self.menu_marker.clone(), MenuState::AtTopMenu)
            .send(format!("{}{}", self.shell_option, self.line_terminator))
            .expect(self.shell_marker.clone(), MenuState::AtShellPrompt)
            .send(format!("{}{}", self.diagnostic_line(), self.line_terminator))
            .expect(self.menu_marker.clone(), MenuState::AtTopMenuFinal)
            .build()
    }
}
