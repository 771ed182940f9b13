use chrono::{NaiveDate, NaiveDateTime};
use metaform_types::{FieldFormat, FieldMetadata, FieldValue, ValidationIssue, ValueType};

use super::{FieldKind, is_null_text};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_INPUTS: &[&str] = &[TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Calendar dates and timestamps in ISO notation.
#[derive(Debug, Clone)]
pub struct DateKind {
    with_time: bool,
    format: FieldFormat,
}

impl DateKind {
    fn parse_moment(&self, text: &str) -> Result<NaiveDateTime, String> {
        let trimmed = text.trim();
        if self.with_time {
            for pattern in TIMESTAMP_INPUTS {
                if let Ok(moment) = NaiveDateTime::parse_from_str(trimmed, pattern) {
                    return Ok(moment);
                }
            }
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(|date| date.and_time(chrono::NaiveTime::MIN))
            .map_err(|error| format!("'{}' is not a valid date: {}", trimmed, error))
    }
}

impl FieldKind for DateKind {
    type Value = NaiveDateTime;

    const VALID_TYPES: &'static [ValueType] = &[ValueType::Date, ValueType::Timestamp];
    const NAME: &'static str = "date";

    fn from_metadata(metadata: &FieldMetadata) -> Self {
        Self {
            with_time: *metadata.value_type() == ValueType::Timestamp,
            format: metadata.effective_format(),
        }
    }

    fn parse(&self, text: &str) -> Result<Option<NaiveDateTime>, String> {
        if is_null_text(text, self.format.supports_nulls()) {
            return Ok(None);
        }
        self.parse_moment(text).map(Some)
    }

    fn display(&self, value: Option<&NaiveDateTime>) -> String {
        let pattern = if self.with_time { TIMESTAMP_FORMAT } else { DATE_FORMAT };
        value.map(|moment| moment.format(pattern).to_string()).unwrap_or_default()
    }

    fn to_field_value(&self, value: &NaiveDateTime) -> FieldValue {
        if self.with_time {
            FieldValue::Timestamp(*value)
        } else {
            FieldValue::Date(value.date())
        }
    }

    fn from_field_value(&self, value: FieldValue) -> Result<NaiveDateTime, FieldValue> {
        match value {
            FieldValue::Date(date) => Ok(date.and_time(chrono::NaiveTime::MIN)),
            FieldValue::Timestamp(moment) => Ok(moment),
            FieldValue::Text(text) => self.parse_moment(&text).map_err(|_| FieldValue::Text(text)),
            other => Err(other),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<(), ValidationIssue> {
        match value {
            FieldValue::Date(_) | FieldValue::Timestamp(_) => Ok(()),
            FieldValue::Text(text) => self.parse_moment(text).map(|_| ()).map_err(ValidationIssue::illegal_value),
            _ => Err(ValidationIssue::illegal_type(if self.with_time { "timestamp" } else { "date" })),
        }
    }
}
