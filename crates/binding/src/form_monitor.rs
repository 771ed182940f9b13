//! Monitor binding a whole form to an application record.
//!
//! Fields are connected to the record through an explicit registration
//! table: each field name maps to a getter and a setter, each action key
//! maps to a handler. A [`FormManager`] makes the application decisions
//! (accept, reject, refresh, exit) after the record was updated.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;
use metaform_types::{FieldValue, MonitorEvent, RefreshMode};
use tracing::{debug, info, warn};

use crate::error::MonitorError;
use crate::localizer::Localizer;
use crate::monitor::{FieldHandle, Monitor};

type Getter<R> = Box<dyn Fn(&R) -> Option<FieldValue>>;
type Setter<R> = Box<dyn Fn(&mut R, Option<FieldValue>) -> Result<(), MonitorError>>;

/// Handler registered for an action key.
pub type ActionHandler<R> = Box<dyn Fn(&mut R, &str) -> Result<RefreshMode, MonitorError>>;

/// Getter/setter pair connecting a field to a record member.
pub struct FieldAccessor<R> {
    get: Getter<R>,
    set: Setter<R>,
}

impl<R> FieldAccessor<R> {
    pub fn new(
        get: impl Fn(&R) -> Option<FieldValue> + 'static,
        set: impl Fn(&mut R, Option<FieldValue>) -> Result<(), MonitorError> + 'static,
    ) -> Self {
        Self {
            get: Box::new(get),
            set: Box::new(set),
        }
    }
}

/// Application callbacks for a form.
pub trait FormManager<R> {
    /// Called after the record received a new value for `field`.
    ///
    /// `final_check` is set during form-level validation, when nothing
    /// changed and the manager only verifies the value.
    fn on_field(
        &self,
        record: &mut R,
        field: &str,
        old_value: Option<&FieldValue>,
        final_check: bool,
    ) -> Result<RefreshMode, MonitorError>;

    /// Fallback for actions without a registered handler.
    fn on_action(&self, _record: &mut R, action: &str) -> Result<RefreshMode, MonitorError> {
        debug!(action, "unhandled action");
        Ok(RefreshMode::Default)
    }

    /// May the form close?
    fn on_exit(&self, _record: &R) -> bool {
        true
    }
}

/// Last message the form wants to show in its status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Tooltip(String),
    Error(String),
}

/// [`Monitor`] over a record `R` driven by a [`FormManager`].
pub struct FormMonitor<R, M: FormManager<R>> {
    record: RefCell<R>,
    manager: M,
    localizer: Rc<dyn Localizer>,
    accessors: IndexMap<String, FieldAccessor<R>>,
    actions: IndexMap<String, ActionHandler<R>>,
    tooltips_on_focus: bool,
    status: RefCell<Option<StatusMessage>>,
    refresh: Cell<RefreshMode>,
    exit_approved: Cell<bool>,
}

impl<R, M: FormManager<R>> FormMonitor<R, M> {
    pub fn new(record: R, manager: M, localizer: Rc<dyn Localizer>) -> Self {
        Self {
            record: RefCell::new(record),
            manager,
            localizer,
            accessors: IndexMap::new(),
            actions: IndexMap::new(),
            tooltips_on_focus: true,
            status: RefCell::new(None),
            refresh: Cell::new(RefreshMode::None),
            exit_approved: Cell::new(false),
        }
    }

    /// Register the accessor pair for `name`.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&R) -> Option<FieldValue> + 'static,
        set: impl Fn(&mut R, Option<FieldValue>) -> Result<(), MonitorError> + 'static,
    ) -> Self {
        self.accessors.insert(name.into(), FieldAccessor::new(get, set));
        self
    }

    /// Register a handler for an action key.
    pub fn with_action(
        mut self,
        key: impl Into<String>,
        handler: impl Fn(&mut R, &str) -> Result<RefreshMode, MonitorError> + 'static,
    ) -> Self {
        self.actions.insert(key.into(), Box::new(handler));
        self
    }

    pub fn with_tooltips_on_focus(mut self, enabled: bool) -> Self {
        self.tooltips_on_focus = enabled;
        self
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    pub fn record(&self) -> Ref<'_, R> {
        self.record.borrow()
    }

    pub fn into_record(self) -> R {
        self.record.into_inner()
    }

    pub fn status(&self) -> Option<StatusMessage> {
        self.status.borrow().clone()
    }

    /// Pending refresh request, reset to `None` once taken.
    pub fn take_refresh(&self) -> RefreshMode {
        self.refresh.replace(RefreshMode::None)
    }

    /// Whether the manager approved closing the form.
    pub fn exit_approved(&self) -> bool {
        self.exit_approved.get()
    }

    /// Ask the manager whether the form may close.
    pub fn request_exit(&self) -> bool {
        let approved = self.manager.on_exit(&*self.record.borrow());
        self.exit_approved.set(approved);
        info!(approved, "exit requested");
        approved
    }

    fn accessor(&self, field: &str) -> Result<&FieldAccessor<R>, MonitorError> {
        self.accessors
            .get(field)
            .ok_or_else(|| MonitorError::content(format!("no accessor registered for field '{}'", field)))
    }

    fn set_status(&self, message: Option<StatusMessage>) {
        *self.status.borrow_mut() = message;
    }

    fn remember_refresh(&self, mode: RefreshMode) {
        if mode.requires_reload() && self.refresh.get() != RefreshMode::Total {
            self.refresh.set(mode);
        }
    }

    fn apply_mode(&self, mode: RefreshMode) -> Result<bool, MonitorError> {
        match mode {
            RefreshMode::Reject => Ok(false),
            RefreshMode::Exit => Ok(self.request_exit()),
            other => {
                self.remember_refresh(other);
                Ok(true)
            }
        }
    }

    fn load(&self, field: &mut dyn FieldHandle) -> Result<bool, MonitorError> {
        let name = field.metadata().name().to_string();
        let value = (self.accessor(&name)?.get)(&*self.record.borrow());
        field.assign_value(value)?;
        Ok(true)
    }

    fn save(&self, field: &mut dyn FieldHandle) -> Result<bool, MonitorError> {
        let name = field.metadata().name().to_string();
        let accessor = self.accessor(&name)?;
        let old_value = field.value();
        let new_value = field.changed_value()?;

        let written = {
            let mut record = self.record.borrow_mut();
            (accessor.set)(&mut *record, new_value)
                .and_then(|()| self.manager.on_field(&mut *record, &name, old_value.as_ref(), false))
        };
        let mode = match written {
            Ok(mode) => mode,
            Err(error) => {
                self.restore_member(accessor, &name, old_value);
                return Err(error);
            }
        };
        debug!(field = %name, ?mode, "field saved");

        let accepted = self.apply_mode(mode)?;
        if !accepted {
            (accessor.set)(&mut *self.record.borrow_mut(), old_value.clone())?;
            field.assign_value(old_value)?;
        }
        Ok(accepted)
    }

    /// Put the committed value back after a failed save.
    fn restore_member(&self, accessor: &FieldAccessor<R>, name: &str, old_value: Option<FieldValue>) {
        if let Err(error) = (accessor.set)(&mut *self.record.borrow_mut(), old_value) {
            warn!(field = %name, %error, "record member could not be restored");
        }
    }

    fn validate(&self, field: &mut dyn FieldHandle, final_check: bool) -> Result<bool, MonitorError> {
        let candidate = match field.changed_value() {
            Ok(candidate) => candidate,
            Err(error) => {
                self.set_status(Some(StatusMessage::Error(error.to_string())));
                return Ok(false);
            }
        };
        if let Some(message) = field.standard_validation(candidate.as_ref()) {
            debug!(field = %field.metadata().name(), %message, "standard validation failed");
            self.set_status(Some(StatusMessage::Error(message)));
            return Ok(false);
        }
        if final_check {
            let name = field.metadata().name().to_string();
            let mode = self
                .manager
                .on_field(&mut *self.record.borrow_mut(), &name, candidate.as_ref(), true)?;
            if mode == RefreshMode::Reject {
                return Ok(false);
            }
        }
        self.set_status(None);
        Ok(true)
    }

    fn tooltip(&self, field: &dyn FieldHandle) -> Result<bool, MonitorError> {
        if self.tooltips_on_focus
            && let Some(id) = field.metadata().tooltip_id()
        {
            let text = self.localizer.value(id)?;
            self.set_status(Some(StatusMessage::Tooltip(text)));
        }
        Ok(true)
    }

    fn action(&self, command: &str) -> Result<bool, MonitorError> {
        let mode = {
            let mut record = self.record.borrow_mut();
            match self.actions.get(command) {
                Some(handler) => handler(&mut *record, command)?,
                None => self.manager.on_action(&mut *record, command)?,
            }
        };
        debug!(action = command, ?mode, "action processed");
        self.apply_mode(mode)
    }
}

impl<R, M: FormManager<R>> Monitor for FormMonitor<R, M> {
    fn process(&self, event: &MonitorEvent, field: &mut dyn FieldHandle) -> Result<bool, MonitorError> {
        match event {
            MonitorEvent::Loading => self.load(field),
            MonitorEvent::Saving => self.save(field),
            MonitorEvent::Validation => self.validate(field, false),
            MonitorEvent::FinalValidation => self.validate(field, true),
            MonitorEvent::FocusGained => self.tooltip(field),
            MonitorEvent::FocusLost => {
                if matches!(*self.status.borrow(), Some(StatusMessage::Tooltip(_))) {
                    self.set_status(None);
                }
                Ok(true)
            }
            MonitorEvent::Rollback => {
                self.set_status(None);
                Ok(true)
            }
            MonitorEvent::Action(command) => self.action(command),
            MonitorEvent::Exit => Ok(self.request_exit()),
        }
    }
}

/// Convenience setter rejecting values of the wrong variant.
pub fn expect_value<T>(
    value: Option<FieldValue>,
    extract: impl FnOnce(FieldValue) -> Option<T>,
) -> Result<Option<T>, MonitorError> {
    match value {
        None => Ok(None),
        Some(value) => {
            let kind = value.kind_name();
            extract(value)
                .map(Some)
                .ok_or_else(|| {
                    warn!(kind, "record member received a value of the wrong kind");
                    MonitorError::content(format!("unexpected {} value", kind))
                })
        }
    }
}
