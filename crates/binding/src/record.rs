//! JSON objects as form records.
//!
//! [`json_form_monitor`] registers one accessor per field of a description,
//! converting between JSON members and [`FieldValue`]s according to the
//! declared type. Used by the CLI, where records come from files.

use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use metaform_types::{FieldMetadata, FieldValue, RefreshMode, ValueType};
use serde_json::{Map, Number, Value};
use tracing::warn;
use url::Url;

use crate::error::MonitorError;
use crate::form_monitor::{FormManager, FormMonitor};
use crate::localizer::Localizer;

/// Record backed by a JSON object.
pub type JsonRecord = Map<String, Value>;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a JSON member to the value a field of `value_type` works with.
///
/// `null` and missing members are `None`.
pub fn from_json(value_type: &ValueType, value: &Value) -> Result<Option<FieldValue>, MonitorError> {
    if value.is_null() {
        return Ok(None);
    }
    let mismatch = || MonitorError::content(format!("expected a {} value, got {}", value_type, value));
    let converted = match value_type {
        ValueType::String | ValueType::Char => FieldValue::Text(value.as_str().ok_or_else(mismatch)?.to_string()),
        ValueType::Uri => {
            let text = value.as_str().ok_or_else(mismatch)?;
            FieldValue::Uri(Url::parse(text).map_err(|error| MonitorError::content(error.to_string()))?)
        }
        ValueType::Boolean => FieldValue::Boolean(value.as_bool().ok_or_else(mismatch)?),
        ValueType::Date => {
            let text = value.as_str().ok_or_else(mismatch)?;
            FieldValue::Date(
                NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|error| MonitorError::content(error.to_string()))?,
            )
        }
        ValueType::Timestamp => {
            let text = value.as_str().ok_or_else(mismatch)?;
            FieldValue::Timestamp(
                NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
                    .map_err(|error| MonitorError::content(error.to_string()))?,
            )
        }
        ValueType::Enum(_) => FieldValue::Enum(value.as_str().ok_or_else(mismatch)?.to_string()),
        integral if integral.is_integral() => FieldValue::Integer(value.as_i64().ok_or_else(mismatch)?),
        _ => FieldValue::Numeric(value.as_f64().ok_or_else(mismatch)?),
    };
    Ok(Some(converted))
}

/// JSON representation of a field value. Non-finite numbers become `null`.
pub fn to_json(value: Option<&FieldValue>) -> Value {
    match value {
        None => Value::Null,
        Some(FieldValue::Text(text)) | Some(FieldValue::Enum(text)) => Value::String(text.clone()),
        Some(FieldValue::Boolean(flag)) => Value::Bool(*flag),
        Some(FieldValue::Integer(number)) => Value::Number((*number).into()),
        Some(FieldValue::Numeric(number)) => Number::from_f64(*number).map(Value::Number).unwrap_or(Value::Null),
        Some(FieldValue::Date(date)) => Value::String(date.format(DATE_FORMAT).to_string()),
        Some(FieldValue::Timestamp(moment)) => Value::String(moment.format(TIMESTAMP_FORMAT).to_string()),
        Some(FieldValue::Uri(url)) => Value::String(url.to_string()),
    }
}

/// Manager that accepts every change and allows closing at any time.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptingManager;

impl FormManager<JsonRecord> for AcceptingManager {
    fn on_field(
        &self,
        _record: &mut JsonRecord,
        _field: &str,
        _old_value: Option<&FieldValue>,
        _final_check: bool,
    ) -> Result<RefreshMode, MonitorError> {
        Ok(RefreshMode::Default)
    }
}

/// Form monitor over a JSON record with an accessor for every field in `fields`.
///
/// Members that don't convert to the declared type load as `None` and are
/// reported at warn level.
pub fn json_form_monitor<M: FormManager<JsonRecord>>(
    record: JsonRecord,
    fields: &[FieldMetadata],
    manager: M,
    localizer: Rc<dyn Localizer>,
) -> FormMonitor<JsonRecord, M> {
    fields.iter().fold(FormMonitor::new(record, manager, localizer), |monitor, metadata| {
        let value_type = metadata.value_type().clone();
        let getter_name = metadata.name().to_string();
        let setter_name = getter_name.clone();
        monitor.with_field(
            metadata.name(),
            move |record: &JsonRecord| {
                let value = record.get(&getter_name)?;
                from_json(&value_type, value)
                    .inspect_err(|error| warn!(field = %getter_name, %error, "record member ignored"))
                    .ok()
                    .flatten()
            },
            move |record: &mut JsonRecord, value| {
                record.insert(setter_name.clone(), to_json(value.as_ref()));
                Ok(())
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Form;
    use crate::localizer::CatalogLocalizer;
    use crate::monitor::Monitor;
    use crate::widget::MemoryWidget;
    use serde_json::json;

    fn description() -> Vec<FieldMetadata> {
        vec![
            FieldMetadata::new("name", ValueType::String).with_format("m").unwrap(),
            FieldMetadata::new("age", ValueType::Short),
            FieldMetadata::new("since", ValueType::Date),
        ]
    }

    #[test]
    fn members_convert_by_declared_type() {
        assert_eq!(from_json(&ValueType::Int, &json!(42)).unwrap(), Some(FieldValue::Integer(42)));
        assert_eq!(from_json(&ValueType::Double, &json!(4)).unwrap(), Some(FieldValue::Numeric(4.0)));
        assert_eq!(from_json(&ValueType::String, &Value::Null).unwrap(), None);
        assert!(from_json(&ValueType::Boolean, &json!("yes")).is_err());
        assert!(from_json(&ValueType::Date, &json!("31.12.2024")).is_err());
        assert_eq!(
            to_json(Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()))),
            json!("2024-12-31")
        );
        assert_eq!(to_json(Some(&FieldValue::Numeric(f64::NAN))), Value::Null);
    }

    #[test]
    fn form_edits_flow_into_the_record() {
        let record = json!({"name": "Ann", "age": 41, "since": "2020-02-29"});
        let Value::Object(record) = record else { unreachable!() };
        let localizer: Rc<dyn Localizer> = Rc::new(CatalogLocalizer::new());
        let monitor = Rc::new(json_form_monitor(record, &description(), AcceptingManager, localizer.clone()));
        let shared: Rc<dyn Monitor> = monitor.clone();
        let mut form = Form::from_description(description(), shared, localizer, |_| MemoryWidget::new()).unwrap();
        form.show();
        assert_eq!(form.control("since").unwrap().widget().text, "2020-02-29");

        assert!(form.focus("age").unwrap());
        form.focused_mut().unwrap().widget_mut().type_text("42");
        form.focused_mut().unwrap().on_edit();
        assert!(form.release_focus());
        assert_eq!(monitor.record().get("age"), Some(&json!(42)));
    }

    #[test]
    fn unconvertible_member_loads_as_initial_value() {
        let record = json!({"age": "forty"});
        let Value::Object(record) = record else { unreachable!() };
        let localizer: Rc<dyn Localizer> = Rc::new(CatalogLocalizer::new());
        let monitor: Rc<dyn Monitor> =
            Rc::new(json_form_monitor(record, &description(), AcceptingManager, localizer.clone()));
        let mut form = Form::from_description(description(), monitor, localizer, |_| MemoryWidget::new()).unwrap();
        form.show();
        assert_eq!(form.control("age").unwrap().widget().text, "0");
    }
}
