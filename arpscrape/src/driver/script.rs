//! Menu navigation scripts.
//!
//! The console's menu tree is fixed, so navigation is a linear list of
//! steps rather than a general menu interpreter. Each step optionally sends
//! a line, then waits for one marker, after which the device is known to be
//! in the step's target state.

use std::fmt;

use crate::channel::PromptMarker;

/// Where the driver believes the device is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuState {
    /// No session.
    Disconnected,

    /// Session and shell open, nothing recognized yet.
    Connected,

    /// Top-level console menu is waiting for a selection.
    AtTopMenu,

    /// Shell prompt reached.
    AtShellPrompt,

    /// Back at the top-level menu after the diagnostic command ran.
    AtTopMenuFinal,
}

impl fmt::Display for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MenuState::Disconnected => "disconnected",
            MenuState::Connected => "connected",
            MenuState::AtTopMenu => "top-menu",
            MenuState::AtShellPrompt => "shell-prompt",
            MenuState::AtTopMenuFinal => "top-menu(final)",
        };
        f.write_str(name)
    }
}

/// One step of a navigation script.
///
/// # Example
///
/// ```rust
/// use arpscrape::channel::PromptMarker;
/// use arpscrape::driver::{MenuState, MenuStep};
///
/// let step = MenuStep::new(Some("8\n".into()), PromptMarker::new("root@"), MenuState::AtShellPrompt);
/// assert_eq!(step.input.as_deref(), Some("8\n"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuStep {
    /// Line to send before waiting, terminator included.
    pub input: Option<String>,

    /// Marker to wait for.
    pub marker: PromptMarker,

    /// State reached once the marker is seen.
    pub reaches: MenuState,
}

impl MenuStep {
    /// Create a step.
    pub fn new(input: Option<String>, marker: PromptMarker, reaches: MenuState) -> Self {
        Self {
            input,
            marker,
            reaches,
        }
    }
}

/// Ordered list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuScript {
    steps: Vec<MenuStep>,
}

impl MenuScript {
    /// Start building a script.
    pub fn builder() -> ScriptBuilder {
        ScriptBuilder::default()
    }

    /// The steps in execution order.
    pub fn steps(&self) -> &[MenuStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the script has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Lines the script sends, in order.
    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|s| s.input.as_deref())
    }
}

/// Builder for [`MenuScript`].
///
/// # Example
///
/// ```rust
/// use arpscrape::channel::PromptMarker;
/// use arpscrape::driver::{MenuScript, MenuState};
///
/// let menu = PromptMarker::new("Enter an option:");
/// let script = MenuScript::builder()
///     .expect(menu.clone(), MenuState::AtTopMenu)
///     .send("8\n")
///     .expect(PromptMarker::new("root@"), MenuState::AtShellPrompt)
///     .send("arp -a ; exit\n")
///     .expect(menu, MenuState::AtTopMenuFinal)
///     .build();
/// assert_eq!(script.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    steps: Vec<MenuStep>,
}

impl ScriptBuilder {
    /// Wait for a marker without sending anything first.
    pub fn expect(mut self, marker: PromptMarker, reaches: MenuState) -> Self {
        self.steps.push(MenuStep::new(None, marker, reaches));
        self
    }

    /// Send a line. Must be followed by `expect()`.
    pub fn send(self, input: impl Into<String>) -> ScriptBuilderWithInput {
        ScriptBuilderWithInput {
            builder: self,
            input: input.into(),
        }
    }

    /// Build the script.
    pub fn build(self) -> MenuScript {
        MenuScript { steps: self.steps }
    }
}

/// Intermediate state for the builder after `send()` is called.
#[derive(Debug)]
pub struct ScriptBuilderWithInput {
    builder: ScriptBuilder,
    input: String,
}

impl ScriptBuilderWithInput {
    /// Marker to wait for after sending the input.
    pub fn expect(mut self, marker: PromptMarker, reaches: MenuState) -> ScriptBuilder {
        self.builder
            .steps
            .push(MenuStep::new(Some(self.input), marker, reaches));
        self.builder
    }
}
