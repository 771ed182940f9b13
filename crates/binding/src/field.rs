//! The field binding controller.
//!
//! [`BoundField`] wraps one widget and drives the monitor protocol:
//!
//! ```text
//! Unbound --shown--> Loaded --focus--> Focused{dirty: false} --edit--> Focused{dirty: true}
//!                                ^                                        |
//!                                +------------ Unfocused <---focus lost---+
//! ```
//!
//! The controller owns three value slots. `committed` is the last value the
//! monitor accepted, `pending` is the value currently shown by the widget,
//! and `baseline` is the widget text captured when focus was gained. Pending
//! diverges from committed only while the field has focus; leaving the field
//! either commits the change or restores the committed value.
//!
//! Monitor failures never escape the event handlers. They are logged and
//! reduced to "no change" (or `false` for verdict events).

use std::rc::Rc;

use metaform_types::{FieldFormat, FieldMetadata, FieldValue, MonitorEvent, check_presence};
use tracing::{debug, trace, warn};

use crate::error::{FieldError, MonitorError};
use crate::kind::{FieldKind, accepted_names, accepts};
use crate::localizer::{Localizer, localized_label, validation_message};
use crate::monitor::{FieldHandle, Monitor};
use crate::widget::{Highlight, Presentation, WidgetAdapter};

/// Lifecycle phase of a bound field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPhase {
    /// Constructed, never shown.
    Unbound,
    /// Initial value loaded, focus never gained.
    Loaded,
    /// Focus owner; `dirty` once the user edited the content.
    Focused { dirty: bool },
    Unfocused,
}

impl FieldPhase {
    pub fn is_focused(&self) -> bool {
        matches!(self, FieldPhase::Focused { .. })
    }
}

/// A widget bound to a metadata node and a monitor.
pub struct BoundField<K: FieldKind, W: WidgetAdapter> {
    metadata: FieldMetadata,
    format: FieldFormat,
    kind: K,
    widget: W,
    monitor: Rc<dyn Monitor>,
    localizer: Rc<dyn Localizer>,
    label: String,
    committed: Option<K::Value>,
    pending: Option<K::Value>,
    baseline: String,
    invalid: bool,
    phase: FieldPhase,
}

impl<K: FieldKind, W: WidgetAdapter> BoundField<K, W> {
    /// Bind `widget` to `metadata`.
    ///
    /// Fails when the declared type is not one the kind can display.
    pub fn new(
        metadata: FieldMetadata,
        monitor: Rc<dyn Monitor>,
        localizer: Rc<dyn Localizer>,
        mut widget: W,
    ) -> Result<Self, FieldError> {
        if !accepts::<K>(metadata.value_type()) {
            return Err(FieldError::IncompatibleType {
                field: metadata.name().to_string(),
                declared: metadata.value_type().clone(),
                accepted: accepted_names::<K>(),
            });
        }

        let format = metadata.effective_format();
        let kind = K::from_metadata(&metadata);
        let initial = kind.initial_value();
        let text = kind.display(initial.as_ref());
        widget.apply_presentation(&Presentation::from_metadata(&metadata, &format));
        widget.set_text(&text);

        let mut field = Self {
            label: metadata.label_id().to_string(),
            metadata,
            format,
            kind,
            widget,
            monitor,
            localizer,
            committed: initial.clone(),
            pending: initial,
            baseline: text,
            invalid: false,
            phase: FieldPhase::Unbound,
        };
        field.fill_localized_strings();
        debug!(field = %field.metadata.name(), kind = K::NAME, format = %field.format, "field bound");
        Ok(field)
    }

    pub fn name(&self) -> &str {
        self.metadata.name()
    }

    pub fn format(&self) -> &FieldFormat {
        &self.format
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Localized label.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn phase(&self) -> FieldPhase {
        self.phase
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn committed(&self) -> Option<&K::Value> {
        self.committed.as_ref()
    }

    pub fn pending(&self) -> Option<&K::Value> {
        self.pending.as_ref()
    }

    /// Parse the widget text without touching any state.
    pub fn parse_widget(&self) -> Result<Option<K::Value>, FieldError> {
        let text = self.widget.text();
        self.kind.parse(&text).map_err(|reason| FieldError::Syntax {
            field: self.metadata.name().to_string(),
            text,
            reason,
        })
    }

    /// Typed counterpart of [`FieldHandle::assign_value`].
    pub fn set_value(&mut self, value: Option<K::Value>) -> Result<(), FieldError> {
        if value.is_none() && !self.format.supports_nulls() {
            return Err(FieldError::NullNotAllowed {
                field: self.metadata.name().to_string(),
            });
        }
        let text = self.kind.display(value.as_ref());
        self.widget.set_text(&text);
        self.pending = value;
        self.mark_invalid(false);
        self.refresh_highlight();
        Ok(())
    }

    /// First display. Issues `Loading` once; later calls are no-ops.
    pub fn on_shown(&mut self) {
        if self.phase != FieldPhase::Unbound {
            return;
        }
        self.load();
        self.phase = FieldPhase::Loaded;
    }

    /// Ask the monitor for a fresh value, as after a record refresh.
    pub fn reload(&mut self) {
        if matches!(self.phase, FieldPhase::Focused { dirty: true }) {
            debug!(field = %self.metadata.name(), "reload skipped; field has unsaved edits");
            return;
        }
        self.load();
    }

    pub fn on_focus_gained(&mut self) {
        if self.phase == FieldPhase::Unbound {
            self.on_shown();
        }
        self.baseline = self.widget.text();
        if self.format.select_on_focus() {
            self.widget.select_all();
        }
        self.phase = FieldPhase::Focused { dirty: false };
        self.notify(MonitorEvent::FocusGained);
    }

    /// The user changed the widget content.
    pub fn on_edit(&mut self) {
        if self.phase.is_focused() {
            self.phase = FieldPhase::Focused { dirty: true };
        }
    }

    pub fn on_focus_lost(&mut self) {
        let text = self.widget.text();
        if text != self.baseline {
            self.save(&text);
        }
        self.phase = FieldPhase::Unfocused;
        self.notify(MonitorEvent::FocusLost);
    }

    /// Input verification: may focus leave this field?
    pub fn on_validate(&mut self) -> bool {
        let verdict = self.verdict(MonitorEvent::Validation);
        if verdict && let Ok(value) = self.parse_widget() {
            self.pending = value;
        }
        self.mark_invalid(!verdict);
        verdict
    }

    /// Verification performed when the whole form is committed.
    pub fn on_final_validation(&mut self) -> bool {
        let verdict = self.verdict(MonitorEvent::FinalValidation);
        self.mark_invalid(!verdict);
        verdict
    }

    /// Cancel gesture. On approval the committed value comes back,
    /// bypassing validation.
    pub fn on_rollback_key(&mut self) -> bool {
        match self.dispatch(MonitorEvent::Rollback) {
            Ok(true) => {
                self.restore_committed();
                if self.phase.is_focused() {
                    self.phase = FieldPhase::Focused { dirty: false };
                }
                true
            }
            Ok(false) => false,
            Err(error) => {
                debug!(field = %self.metadata.name(), %error, "rollback skipped");
                false
            }
        }
    }

    pub fn on_action(&mut self, command: &str) {
        self.notify(MonitorEvent::Action(command.to_string()));
    }

    /// Re-read label and tooltip for the current locale.
    pub fn locale_changed(&mut self) {
        self.fill_localized_strings();
    }

    fn load(&mut self) {
        match self.dispatch(MonitorEvent::Loading) {
            Ok(_) => {
                self.committed = self.pending.clone();
                self.baseline = self.widget.text();
                trace!(field = %self.metadata.name(), value = ?self.committed, "loaded");
            }
            Err(error) => {
                warn!(field = %self.metadata.name(), %error, "loading failed; keeping previous value");
                self.restore_committed();
            }
        }
    }

    fn save(&mut self, text: &str) {
        match self.kind.parse(text) {
            Ok(value) => self.pending = value,
            Err(reason) => {
                warn!(field = %self.metadata.name(), text, %reason, "unparsable content; restoring committed value");
                self.restore_committed();
                return;
            }
        }
        match self.dispatch(MonitorEvent::Saving) {
            Ok(true) => {
                self.committed = self.pending.clone();
                self.baseline = self.widget.text();
                self.refresh_highlight();
                debug!(field = %self.metadata.name(), value = ?self.committed, "change committed");
            }
            Ok(false) => {
                debug!(field = %self.metadata.name(), "change rejected");
                self.restore_committed();
            }
            Err(error) => {
                warn!(field = %self.metadata.name(), %error, "saving failed; restoring committed value");
                self.restore_committed();
            }
        }
    }

    fn restore_committed(&mut self) {
        let text = self.kind.display(self.committed.as_ref());
        self.widget.set_text(&text);
        self.pending = self.committed.clone();
        self.baseline = text;
        self.mark_invalid(false);
        self.refresh_highlight();
    }

    fn verdict(&mut self, event: MonitorEvent) -> bool {
        match self.dispatch(event) {
            Ok(verdict) => verdict,
            Err(error) => {
                debug!(field = %self.metadata.name(), %error, "verification failed");
                false
            }
        }
    }

    fn dispatch(&mut self, event: MonitorEvent) -> Result<bool, MonitorError> {
        let monitor = Rc::clone(&self.monitor);
        trace!(field = %self.metadata.name(), %event, "monitor event");
        monitor.process(&event, self)
    }

    fn notify(&mut self, event: MonitorEvent) {
        if let Err(error) = self.dispatch(event.clone()) {
            warn!(field = %self.metadata.name(), %event, %error, "monitor failed to process notification");
        }
    }

    fn mark_invalid(&mut self, invalid: bool) {
        self.invalid = invalid;
        self.widget.set_invalid_marker(invalid);
    }

    fn refresh_highlight(&mut self) {
        let signum = self
            .pending
            .as_ref()
            .map(|value| self.kind.to_field_value(value).signum())
            .unwrap_or(0);
        self.widget.set_highlight(Highlight::for_sign(&self.format, signum));
    }

    fn fill_localized_strings(&mut self) {
        self.label = localized_label(self.localizer.as_ref(), &self.metadata);
        let tooltip = match self.metadata.tooltip_id() {
            Some(id) => match self.localizer.value(id) {
                Ok(text) => Some(text),
                Err(error) => {
                    warn!(field = %self.metadata.name(), %error, "tooltip not localized");
                    None
                }
            },
            None => None,
        };
        self.widget.set_tooltip(tooltip.as_deref());
    }
}

impl<K: FieldKind, W: WidgetAdapter> FieldHandle for BoundField<K, W> {
    fn metadata(&self) -> &FieldMetadata {
        &self.metadata
    }

    fn raw_data(&self) -> Option<String> {
        self.committed.as_ref().map(|value| self.kind.display(Some(value)))
    }

    fn value(&self) -> Option<FieldValue> {
        self.committed.as_ref().map(|value| self.kind.to_field_value(value))
    }

    fn changed_value(&self) -> Result<Option<FieldValue>, FieldError> {
        Ok(self.parse_widget()?.map(|value| self.kind.to_field_value(&value)))
    }

    fn assign_value(&mut self, value: Option<FieldValue>) -> Result<(), FieldError> {
        let typed = match value {
            None => None,
            Some(value) => {
                let actual = value.kind_name();
                let converted = self.kind.from_field_value(value).map_err(|_| FieldError::ValueMismatch {
                    field: self.metadata.name().to_string(),
                    expected: K::NAME,
                    actual,
                })?;
                Some(converted)
            }
        };
        self.set_value(typed)
    }

    fn standard_validation(&self, value: Option<&FieldValue>) -> Option<String> {
        let outcome = check_presence(value, &self.format).and_then(|present| match present {
            Some(value) => self.kind.check(value),
            None => Ok(()),
        });
        outcome
            .err()
            .map(|issue| validation_message(self.localizer.as_ref(), &self.metadata, &issue))
    }

    fn is_invalid(&self) -> bool {
        self.invalid
    }

    fn set_invalid(&mut self, invalid: bool) {
        self.mark_invalid(invalid);
    }
}
