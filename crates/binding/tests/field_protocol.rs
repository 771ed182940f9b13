use std::cell::{Cell, RefCell};
use std::rc::Rc;

use metaform_binding::{
    BooleanKind, BoundField, CatalogLocalizer, EnumKind, FieldError, FieldHandle, FieldPhase, Localizer, MemoryWidget,
    Monitor, MonitorError, NumericKind, TextKind,
};
use metaform_types::{FieldMetadata, FieldValue, MonitorEvent, ValueType};

/// Monitor with canned answers that records every event it sees.
struct Scripted {
    initial: Option<FieldValue>,
    accept_saving: Cell<bool>,
    approve_rollback: Cell<bool>,
    failing: RefCell<Vec<MonitorEvent>>,
    events: RefCell<Vec<MonitorEvent>>,
}

impl Scripted {
    fn loading(initial: impl Into<FieldValue>) -> Rc<Self> {
        Rc::new(Self {
            initial: Some(initial.into()),
            accept_saving: Cell::new(true),
            approve_rollback: Cell::new(true),
            failing: RefCell::new(Vec::new()),
            events: RefCell::new(Vec::new()),
        })
    }

    fn fail_on(&self, event: MonitorEvent) {
        self.failing.borrow_mut().push(event);
    }

    fn count(&self, event: &MonitorEvent) -> usize {
        self.events.borrow().iter().filter(|seen| *seen == event).count()
    }
}

impl Monitor for Scripted {
    fn process(&self, event: &MonitorEvent, field: &mut dyn FieldHandle) -> Result<bool, MonitorError> {
        self.events.borrow_mut().push(event.clone());
        if self.failing.borrow().contains(event) {
            return Err(MonitorError::content(format!("{} failed", event)));
        }
        match event {
            MonitorEvent::Loading => {
                field.assign_value(self.initial.clone())?;
                Ok(true)
            }
            MonitorEvent::Saving => Ok(self.accept_saving.get()),
            MonitorEvent::Rollback => Ok(self.approve_rollback.get()),
            MonitorEvent::Validation => {
                let candidate = field.changed_value()?;
                Ok(field.standard_validation(candidate.as_ref()).is_none())
            }
            _ => Ok(true),
        }
    }
}

fn localizer() -> Rc<dyn Localizer> {
    Rc::new(CatalogLocalizer::new())
}

fn text_field(monitor: &Rc<Scripted>) -> BoundField<TextKind, MemoryWidget> {
    let metadata = FieldMetadata::new("title", ValueType::String);
    BoundField::new(metadata, monitor.clone(), localizer(), MemoryWidget::new()).expect("bind text field")
}

fn price_field(monitor: &Rc<Scripted>) -> BoundField<NumericKind, MemoryWidget> {
    let metadata = FieldMetadata::new("price", ValueType::BigDecimal);
    BoundField::new(metadata, monitor.clone(), localizer(), MemoryWidget::new()).expect("bind price field")
}

fn edit<K: metaform_binding::FieldKind>(field: &mut BoundField<K, MemoryWidget>, text: &str) {
    field.widget_mut().type_text(text);
    field.on_edit();
}

#[test]
fn loading_sets_committed_value() {
    let monitor = Scripted::loading("abc");
    let mut field = text_field(&monitor);
    field.on_shown();
    field.on_shown();

    assert_eq!(monitor.count(&MonitorEvent::Loading), 1);
    assert_eq!(field.value(), Some(FieldValue::from("abc")));
    assert_eq!(field.widget().text, "abc");
    assert_eq!(field.phase(), FieldPhase::Loaded);
}

#[test]
fn focus_lost_without_edit_skips_saving() {
    let monitor = Scripted::loading("abc");
    let mut field = text_field(&monitor);
    field.on_shown();
    field.on_focus_gained();
    field.on_focus_lost();

    assert_eq!(monitor.count(&MonitorEvent::Saving), 0);
    assert_eq!(monitor.count(&MonitorEvent::FocusLost), 1);
    assert_eq!(field.value(), Some(FieldValue::from("abc")));
}

#[test]
fn accepted_edit_commits_once() {
    let monitor = Scripted::loading("abc");
    let mut field = text_field(&monitor);
    field.on_shown();
    field.on_focus_gained();
    edit(&mut field, "abcd");
    assert_eq!(field.phase(), FieldPhase::Focused { dirty: true });
    field.on_focus_lost();

    assert_eq!(monitor.count(&MonitorEvent::Saving), 1);
    assert_eq!(field.value(), Some(FieldValue::from("abcd")));
    assert_eq!(field.raw_data().as_deref(), Some("abcd"));
    assert_eq!(field.phase(), FieldPhase::Unfocused);
}

#[test]
fn rejected_edit_restores_committed_value() {
    let monitor = Scripted::loading("abc");
    monitor.accept_saving.set(false);
    let mut field = text_field(&monitor);
    field.on_shown();
    field.on_focus_gained();
    edit(&mut field, "abcd");
    field.on_focus_lost();

    assert_eq!(monitor.count(&MonitorEvent::Saving), 1);
    assert_eq!(monitor.count(&MonitorEvent::FocusLost), 1);
    assert_eq!(field.value(), Some(FieldValue::from("abc")));
    assert_eq!(field.widget().text, "abc");
}

#[test]
fn failed_saving_keeps_committed_value() {
    let monitor = Scripted::loading("abc");
    monitor.fail_on(MonitorEvent::Saving);
    let mut field = text_field(&monitor);
    field.on_shown();
    field.on_focus_gained();
    edit(&mut field, "abcd");
    field.on_focus_lost();

    assert_eq!(monitor.count(&MonitorEvent::Saving), 1);
    assert_eq!(monitor.count(&MonitorEvent::FocusLost), 1);
    assert_eq!(field.value(), Some(FieldValue::from("abc")));
    assert_eq!(field.widget().text, "abc");
    assert_eq!(field.phase(), FieldPhase::Unfocused);
    assert!(!field.is_invalid());
}

#[test]
fn failed_focus_notifications_are_swallowed() {
    let monitor = Scripted::loading("abc");
    monitor.fail_on(MonitorEvent::FocusGained);
    monitor.fail_on(MonitorEvent::FocusLost);
    let mut field = text_field(&monitor);
    field.on_shown();

    field.on_focus_gained();
    assert_eq!(field.phase(), FieldPhase::Focused { dirty: false });
    edit(&mut field, "abcd");
    field.on_focus_lost();

    assert_eq!(monitor.count(&MonitorEvent::FocusGained), 1);
    assert_eq!(monitor.count(&MonitorEvent::FocusLost), 1);
    assert_eq!(field.phase(), FieldPhase::Unfocused);
    assert_eq!(field.value(), Some(FieldValue::from("abcd")));
}

#[test]
fn saving_precedes_focus_lost() {
    let monitor = Scripted::loading("abc");
    let mut field = text_field(&monitor);
    field.on_shown();
    field.on_focus_gained();
    edit(&mut field, "xyz");
    field.on_focus_lost();

    let events = monitor.events.borrow();
    assert_eq!(
        events.as_slice(),
        &[
            MonitorEvent::Loading,
            MonitorEvent::FocusGained,
            MonitorEvent::Saving,
            MonitorEvent::FocusLost
        ]
    );
}

#[test]
fn approved_rollback_restores_display() {
    let monitor = Scripted::loading(10.0);
    let mut field = price_field(&monitor);
    field.on_shown();
    assert_eq!(field.widget().text, "10.00");

    field.on_focus_gained();
    edit(&mut field, "999");
    assert!(field.on_rollback_key());

    assert_eq!(field.widget().text, "10.00");
    assert_eq!(field.phase(), FieldPhase::Focused { dirty: false });
    assert!(!field.is_invalid());

    field.on_focus_lost();
    assert_eq!(monitor.count(&MonitorEvent::Saving), 0);
    assert_eq!(field.value(), Some(FieldValue::Numeric(10.0)));
}

#[test]
fn rejected_or_failed_rollback_keeps_content() {
    let monitor = Scripted::loading(10.0);
    monitor.approve_rollback.set(false);
    let mut field = price_field(&monitor);
    field.on_shown();
    field.on_focus_gained();
    edit(&mut field, "999");
    assert!(!field.on_rollback_key());
    assert_eq!(field.widget().text, "999");

    monitor.fail_on(MonitorEvent::Rollback);
    assert!(!field.on_rollback_key());
    assert_eq!(field.widget().text, "999");
}

#[test]
fn validation_sets_and_clears_invalid_flag() {
    let monitor = Scripted::loading(10.0);
    let mut field = price_field(&monitor);
    field.on_shown();
    field.on_focus_gained();

    edit(&mut field, "12.345");
    assert!(!field.on_validate());
    assert!(field.is_invalid());
    assert!(field.widget().invalid);

    edit(&mut field, "12.34");
    assert!(field.on_validate());
    assert!(!field.is_invalid());
    assert_eq!(field.pending(), Some(&12.34));
}

#[test]
fn standard_validation_of_null_is_idempotent() {
    let monitor = Scripted::loading("abc");
    let strict = text_field(&monitor);
    let first = strict.standard_validation(None);
    assert!(first.is_some());
    assert_eq!(strict.standard_validation(None), first);

    let nullable = FieldMetadata::new("note", ValueType::String).with_format("N").unwrap();
    let lenient: BoundField<TextKind, _> =
        BoundField::new(nullable, monitor.clone(), localizer(), MemoryWidget::new()).unwrap();
    assert_eq!(lenient.standard_validation(None), None);
}

#[test]
fn mandatory_blank_text_is_diagnosed() {
    let monitor = Scripted::loading("abc");
    let metadata = FieldMetadata::new("title", ValueType::String).with_format("m").unwrap();
    let field: BoundField<TextKind, _> = BoundField::new(metadata, monitor.clone(), localizer(), MemoryWidget::new()).unwrap();
    let message = field.standard_validation(Some(&FieldValue::from("  "))).expect("diagnostic");
    assert!(message.contains("mandatory") && message.contains("(title)"), "message: {}", message);
}

#[test]
fn assigned_values_read_back_unchanged() {
    let monitor = Scripted::loading(false);
    let mut flag: BoundField<BooleanKind, _> = BoundField::new(
        FieldMetadata::new("active", ValueType::Boolean),
        monitor.clone(),
        localizer(),
        MemoryWidget::new(),
    )
    .unwrap();
    flag.assign_value(Some(FieldValue::Boolean(true))).unwrap();
    assert_eq!(flag.changed_value().unwrap(), Some(FieldValue::Boolean(true)));

    let monitor = Scripted::loading(0.0);
    let mut price = price_field(&monitor);
    for amount in [0.0, 10.25, -3.5, 1234567.89] {
        price.assign_value(Some(FieldValue::Numeric(amount))).unwrap();
        assert_eq!(price.changed_value().unwrap(), Some(FieldValue::Numeric(amount)));
    }
}

#[test]
fn enum_field_starts_on_first_constant() {
    let monitor = Scripted::loading(FieldValue::Enum("Green".into()));
    let metadata = FieldMetadata::new("color", ValueType::Enum(vec!["Red".into(), "Green".into()]));
    let mut field: BoundField<EnumKind, _> =
        BoundField::new(metadata, monitor.clone(), localizer(), MemoryWidget::new()).unwrap();
    assert_eq!(field.widget().text, "Red");
    field.on_shown();
    assert_eq!(field.value(), Some(FieldValue::Enum("Green".into())));
    assert!(matches!(field.assign_value(None), Err(FieldError::NullNotAllowed { .. })));
}

#[test]
fn incompatible_type_fails_construction() {
    let monitor = Scripted::loading("abc");
    let metadata = FieldMetadata::new("title", ValueType::Boolean);
    let result: Result<BoundField<TextKind, _>, _> = BoundField::new(metadata, monitor.clone(), localizer(), MemoryWidget::new());
    match result {
        Err(FieldError::IncompatibleType { field, declared, .. }) => {
            assert_eq!(field, "title");
            assert_eq!(declared, ValueType::Boolean);
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("boolean node bound to a text field"),
    }

    let numeric = FieldMetadata::new("price", ValueType::String);
    let result: Result<BoundField<NumericKind, _>, _> = BoundField::new(numeric, monitor, localizer(), MemoryWidget::new());
    assert!(matches!(result, Err(FieldError::IncompatibleType { .. })));
}

#[test]
fn loading_failure_keeps_initial_value() {
    let failing = |event: &MonitorEvent, _field: &mut dyn FieldHandle| -> Result<bool, MonitorError> {
        match event {
            MonitorEvent::Loading => Err(MonitorError::content("record unavailable")),
            _ => Ok(true),
        }
    };
    let mut field: BoundField<NumericKind, _> = BoundField::new(
        FieldMetadata::new("price", ValueType::Double),
        Rc::new(failing),
        localizer(),
        MemoryWidget::new(),
    )
    .unwrap();
    field.on_shown();
    assert_eq!(field.phase(), FieldPhase::Loaded);
    assert_eq!(field.widget().text, "0.00");
    assert_eq!(field.value(), Some(FieldValue::Numeric(0.0)));
}

#[test]
fn action_and_focus_notifications_reach_monitor() {
    let monitor = Scripted::loading("abc");
    let mut field = text_field(&monitor);
    field.on_focus_gained();
    field.on_action("submit");

    assert_eq!(monitor.count(&MonitorEvent::Loading), 1);
    assert_eq!(monitor.count(&MonitorEvent::FocusGained), 1);
    assert_eq!(monitor.count(&MonitorEvent::Action("submit".into())), 1);
}
