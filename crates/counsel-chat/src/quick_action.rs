//! Fixed quick-action prompts from the chat interface's shortcut bar.

/// One-tap prompts shown alongside the input box. Each sends a fixed
/// message as a normal user turn tagged `MessageKind::QuickAction`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuickAction {
    Emergency,
    Settlement,
    CourtPrep,
}

impl QuickAction {
    pub const ALL: [QuickAction; 3] = [
        QuickAction::Emergency,
        QuickAction::Settlement,
        QuickAction::CourtPrep,
    ];

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::Emergency => "Emergency Help",
            QuickAction::Settlement => "Settlement Tips",
            QuickAction::CourtPrep => "Court Prep",
        }
    }

    /// The message text sent when the action is triggered.
    pub fn prompt(&self) -> &'static str {
        match self {
            QuickAction::Emergency => "I need emergency legal help.",
            QuickAction::Settlement => "Give me settlement tips.",
            QuickAction::CourtPrep => "How do I prepare for court?",
        }
    }
}
