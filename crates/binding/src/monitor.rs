//! Monitor contract between a bound field and the application.
//!
//! Every user-visible transition of a field is reported to its [`Monitor`]
//! together with a mutable [`FieldHandle`], so the monitor can read the
//! candidate value or push a new one back into the widget.

use metaform_types::{FieldMetadata, FieldValue, MonitorEvent};

use crate::error::{FieldError, MonitorError};

/// Object safe view of a bound field, handed to monitors.
pub trait FieldHandle {
    fn metadata(&self) -> &FieldMetadata;

    /// Canonical text of the committed value.
    fn raw_data(&self) -> Option<String>;

    /// Last committed value.
    fn value(&self) -> Option<FieldValue>;

    /// Value currently shown by the widget, parsed.
    fn changed_value(&self) -> Result<Option<FieldValue>, FieldError>;

    /// Replace the widget content.
    fn assign_value(&mut self, value: Option<FieldValue>) -> Result<(), FieldError>;

    /// Monitor independent syntactic check. `None` when `value` is acceptable.
    fn standard_validation(&self, value: Option<&FieldValue>) -> Option<String>;

    fn is_invalid(&self) -> bool;

    fn set_invalid(&mut self, invalid: bool);
}

/// Receives field events and decides their outcome.
///
/// The returned flag matters for `Saving`, `Validation`, `FinalValidation`
/// and `Rollback`; other events are notifications.
pub trait Monitor {
    fn process(&self, event: &MonitorEvent, field: &mut dyn FieldHandle) -> Result<bool, MonitorError>;
}

impl<F> Monitor for F
where
    F: Fn(&MonitorEvent, &mut dyn FieldHandle) -> Result<bool, MonitorError>,
{
    fn process(&self, event: &MonitorEvent, field: &mut dyn FieldHandle) -> Result<bool, MonitorError> {
        self(event, field)
    }
}

/// Monitor that approves everything and never touches the field.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Monitor for AcceptAll {
    fn process(&self, _event: &MonitorEvent, _field: &mut dyn FieldHandle) -> Result<bool, MonitorError> {
        Ok(true)
    }
}

/// Monitor that approves an event only when standard validation passes.
///
/// Useful for batch checks where no application logic is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardValidation;

impl Monitor for StandardValidation {
    fn process(&self, event: &MonitorEvent, field: &mut dyn FieldHandle) -> Result<bool, MonitorError> {
        match event {
            MonitorEvent::Validation | MonitorEvent::FinalValidation => {
                let candidate = field.changed_value()?;
                Ok(field.standard_validation(candidate.as_ref()).is_none())
            }
            _ => Ok(true),
        }
    }
}
