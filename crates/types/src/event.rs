//! Events exchanged between fields and monitors.

use std::fmt;

/// Notification a field sends to its monitor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MonitorEvent {
    /// First display: the monitor should assign the initial value.
    Loading,
    /// Focus left a modified field: the monitor decides whether to accept the change.
    Saving,
    FocusGained,
    FocusLost,
    /// Input verification before focus may leave the field.
    Validation,
    /// Validation performed when the whole form is committed.
    FinalValidation,
    /// Explicit cancel gesture; approval restores the committed value.
    Rollback,
    /// An action command fired by the field (for example Enter in a text field).
    Action(String),
    /// The form should close.
    Exit,
}

impl MonitorEvent {
    /// Events whose boolean verdict changes the field's behavior.
    pub fn is_decisive(&self) -> bool {
        matches!(
            self,
            MonitorEvent::Saving | MonitorEvent::Validation | MonitorEvent::FinalValidation | MonitorEvent::Rollback
        )
    }
}

impl fmt::Display for MonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorEvent::Loading => f.write_str("loading"),
            MonitorEvent::Saving => f.write_str("saving"),
            MonitorEvent::FocusGained => f.write_str("focus-gained"),
            MonitorEvent::FocusLost => f.write_str("focus-lost"),
            MonitorEvent::Validation => f.write_str("validation"),
            MonitorEvent::FinalValidation => f.write_str("final-validation"),
            MonitorEvent::Rollback => f.write_str("rollback"),
            MonitorEvent::Action(command) => write!(f, "action({})", command),
            MonitorEvent::Exit => f.write_str("exit"),
        }
    }
}

/// Outcome of a form manager decision about a changed field or an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// Accept and leave the display as is.
    #[default]
    Default,
    /// Nothing to refresh.
    None,
    /// Refresh only the field that changed.
    FieldOnly,
    /// Reload every field of the current record.
    RecordOnly,
    /// Reload everything the form shows.
    Total,
    /// Undo the change.
    Reject,
    /// Close the form.
    Exit,
}

impl RefreshMode {
    pub fn requires_reload(&self) -> bool {
        matches!(self, RefreshMode::RecordOnly | RefreshMode::Total)
    }
}
