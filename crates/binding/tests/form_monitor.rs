use std::cell::Cell;
use std::rc::Rc;

use metaform_binding::{
    BoundField, CatalogLocalizer, FieldHandle, Form, FormManager, FormMonitor, Localizer, MemoryWidget, Monitor,
    MonitorError, NumericKind, StatusMessage, TextKind, expect_value,
};
use metaform_types::{FieldMetadata, FieldValue, RefreshMode, ValueType};

#[derive(Debug, Default, Clone, PartialEq)]
struct Order {
    customer: String,
    quantity: f64,
    total: f64,
}

/// Rejects negative quantities, recomputes the total, and counts actions.
/// Fails for customers that are not on file.
#[derive(Default)]
struct OrderManager {
    actions: Cell<usize>,
    allow_exit: Cell<bool>,
}

impl FormManager<Order> for OrderManager {
    fn on_field(
        &self,
        record: &mut Order,
        field: &str,
        _old_value: Option<&FieldValue>,
        _final_check: bool,
    ) -> Result<RefreshMode, MonitorError> {
        match field {
            "quantity" if record.quantity < 0.0 => Ok(RefreshMode::Reject),
            "quantity" => {
                record.total = record.quantity * 2.5;
                Ok(RefreshMode::RecordOnly)
            }
            "customer" if record.customer == "quit" => Ok(RefreshMode::Exit),
            "customer" if record.customer == "unknown" => Err(MonitorError::content("customer not on file")),
            _ => Ok(RefreshMode::Default),
        }
    }

    fn on_action(&self, _record: &mut Order, _action: &str) -> Result<RefreshMode, MonitorError> {
        self.actions.set(self.actions.get() + 1);
        Ok(RefreshMode::Default)
    }

    fn on_exit(&self, _record: &Order) -> bool {
        self.allow_exit.get()
    }
}

type OrderMonitor = FormMonitor<Order, OrderManager>;

fn catalog() -> Rc<dyn Localizer> {
    let localizer = CatalogLocalizer::from_json_str(include_str!("data/catalog.json")).expect("catalog fixture");
    Rc::new(localizer)
}

fn order_monitor(localizer: Rc<dyn Localizer>) -> Rc<OrderMonitor> {
    let record = Order {
        customer: "ACME".into(),
        quantity: 4.0,
        total: 10.0,
    };
    let monitor = FormMonitor::new(record, OrderManager::default(), localizer)
        .with_field(
            "customer",
            |order: &Order| Some(FieldValue::Text(order.customer.clone())),
            |order: &mut Order, value| {
                order.customer = expect_value(value, |value| value.as_text().map(str::to_string))?.unwrap_or_default();
                Ok(())
            },
        )
        .with_field(
            "quantity",
            |order: &Order| Some(FieldValue::Numeric(order.quantity)),
            |order: &mut Order, value| {
                order.quantity = expect_value(value, |value| match value {
                    FieldValue::Numeric(number) => Some(number),
                    _ => None,
                })?
                .unwrap_or_default();
                Ok(())
            },
        )
        .with_field(
            "total",
            |order: &Order| Some(FieldValue::Numeric(order.total)),
            |_order: &mut Order, _value| Err(MonitorError::content("total is computed")),
        )
        .with_action("order.clear", |order: &mut Order, _action| {
            order.quantity = 0.0;
            order.total = 0.0;
            Ok(RefreshMode::Total)
        });
    Rc::new(monitor)
}

fn order_form(monitor: &Rc<OrderMonitor>, localizer: &Rc<dyn Localizer>) -> Form<MemoryWidget> {
    let shared: Rc<dyn Monitor> = monitor.clone();
    let mut form = Form::new();
    let customer = FieldMetadata::new("customer", ValueType::String)
        .with_format("m")
        .unwrap()
        .with_tooltip("customer.tt");
    let quantity = FieldMetadata::new("quantity", ValueType::Double);
    let total = FieldMetadata::new("total", ValueType::Double).with_format("o").unwrap();
    form.push(Box::new(
        BoundField::<TextKind, _>::new(customer, shared.clone(), localizer.clone(), MemoryWidget::new()).unwrap(),
    ))
    .unwrap();
    form.push(Box::new(
        BoundField::<NumericKind, _>::new(quantity, shared.clone(), localizer.clone(), MemoryWidget::new()).unwrap(),
    ))
    .unwrap();
    form.push(Box::new(
        BoundField::<NumericKind, _>::new(total, shared, localizer.clone(), MemoryWidget::new()).unwrap(),
    ))
    .unwrap();
    form.show();
    form
}

fn text_of(form: &Form<MemoryWidget>, name: &str) -> String {
    form.control(name).map(|control| control.widget().text.clone()).unwrap_or_default()
}

#[test]
fn loading_reads_record_members() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let form = order_form(&monitor, &localizer);
    assert_eq!(text_of(&form, "customer"), "ACME");
    assert_eq!(text_of(&form, "quantity"), "4.00");
    assert_eq!(text_of(&form, "total"), "10.00");
}

#[test]
fn saving_updates_record_and_requests_refresh() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let mut form = order_form(&monitor, &localizer);

    assert!(form.focus("quantity").unwrap());
    form.focused_mut().unwrap().widget_mut().type_text("6");
    form.focused_mut().unwrap().on_edit();
    assert!(form.release_focus());

    assert_eq!(monitor.record().quantity, 6.0);
    assert_eq!(monitor.record().total, 15.0);
    assert_eq!(monitor.take_refresh(), RefreshMode::RecordOnly);
    assert_eq!(monitor.take_refresh(), RefreshMode::None);

    form.reload();
    assert_eq!(text_of(&form, "total"), "15.00");
}

#[test]
fn rejected_change_restores_record_and_widget() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let mut form = order_form(&monitor, &localizer);

    assert!(form.focus("quantity").unwrap());
    form.focused_mut().unwrap().widget_mut().type_text("-1");
    form.focused_mut().unwrap().on_edit();
    assert!(form.release_focus());

    assert_eq!(monitor.record().quantity, 4.0);
    assert_eq!(text_of(&form, "quantity"), "4.00");
    let committed = form.control("quantity").and_then(|control| control.value());
    assert_eq!(committed, Some(FieldValue::Numeric(4.0)));
}

#[test]
fn failed_manager_check_leaves_record_unchanged() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let mut form = order_form(&monitor, &localizer);

    assert!(form.focus("customer").unwrap());
    form.focused_mut().unwrap().widget_mut().type_text("unknown");
    form.focused_mut().unwrap().on_edit();
    assert!(form.release_focus());

    assert_eq!(monitor.record().customer, "ACME");
    assert_eq!(text_of(&form, "customer"), "ACME");
    let committed = form.control("customer").and_then(|control| control.value());
    assert_eq!(committed, Some(FieldValue::from("ACME")));
}

#[test]
fn failed_setter_leaves_record_unchanged() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let mut field: BoundField<NumericKind, _> = BoundField::new(
        FieldMetadata::new("total", ValueType::Double),
        monitor.clone(),
        localizer,
        MemoryWidget::new(),
    )
    .unwrap();
    field.on_shown();
    field.on_focus_gained();
    field.widget_mut().type_text("99");
    field.on_edit();
    field.on_focus_lost();

    assert_eq!(monitor.record().total, 10.0);
    assert_eq!(field.widget().text, "10.00");
    assert_eq!(field.value(), Some(FieldValue::Numeric(10.0)));
}

#[test]
fn validation_failure_records_status_and_keeps_focus() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let mut form = order_form(&monitor, &localizer);

    assert!(form.focus("customer").unwrap());
    assert_eq!(
        monitor.status(),
        Some(StatusMessage::Tooltip("Who places the order".into()))
    );
    form.focused_mut().unwrap().widget_mut().type_text("");
    form.focused_mut().unwrap().on_edit();
    assert!(!form.focus_next());

    match monitor.status() {
        Some(StatusMessage::Error(message)) => assert_eq!(message, "Customer must be filled"),
        other => panic!("unexpected status: {:?}", other),
    }
    assert_eq!(form.focused().map(|control| control.name()), Some("customer"));
}

#[test]
fn registered_action_runs_before_manager() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let mut form = order_form(&monitor, &localizer);

    assert!(form.focus("quantity").unwrap());
    form.focused_mut().unwrap().on_action("order.clear");
    assert_eq!(monitor.record().quantity, 0.0);
    assert_eq!(monitor.take_refresh(), RefreshMode::Total);

    assert_eq!(monitor.manager().actions.get(), 0);

    form.focused_mut().unwrap().on_action("order.print");
    assert_eq!(monitor.manager().actions.get(), 1);
    assert_eq!(monitor.record().total, 0.0);
}

#[test]
fn exit_mode_asks_manager() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let mut form = order_form(&monitor, &localizer);

    assert!(form.focus("customer").unwrap());
    form.focused_mut().unwrap().widget_mut().type_text("quit");
    form.focused_mut().unwrap().on_edit();
    assert!(form.release_focus());

    assert!(!monitor.exit_approved());
    assert_eq!(monitor.record().customer, "ACME");
    assert_eq!(text_of(&form, "customer"), "ACME");
}

#[test]
fn missing_accessor_is_a_content_error() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let mut field: BoundField<TextKind, _> = BoundField::new(
        FieldMetadata::new("comment", ValueType::String),
        monitor.clone(),
        localizer,
        MemoryWidget::new(),
    )
    .unwrap();
    let error = monitor
        .process(&metaform_types::MonitorEvent::Loading, &mut field)
        .unwrap_err();
    assert!(matches!(error, MonitorError::Content { .. }));
    assert!(field.value().is_none());
}

#[test]
fn final_validation_consults_manager() {
    let localizer = catalog();
    let monitor = order_monitor(localizer.clone());
    let mut form = order_form(&monitor, &localizer);
    assert!(form.final_validation().is_empty());
    assert_eq!(form.values().get("customer"), Some(&Some(FieldValue::from("ACME"))));
}
