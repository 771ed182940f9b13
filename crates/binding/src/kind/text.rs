use metaform_types::{FieldFormat, FieldMetadata, FieldValue, ValidationIssue, ValueType, check_text};

use super::{FieldKind, is_null_text};

/// Free text, optionally constrained by a mask and a length limit.
#[derive(Debug, Clone)]
pub struct TextKind {
    format: FieldFormat,
    single_char: bool,
}

impl FieldKind for TextKind {
    type Value = String;

    const VALID_TYPES: &'static [ValueType] = &[ValueType::String, ValueType::Char, ValueType::Uri];
    const NAME: &'static str = "text";

    fn from_metadata(metadata: &FieldMetadata) -> Self {
        Self {
            format: metadata.effective_format(),
            single_char: *metadata.value_type() == ValueType::Char,
        }
    }

    fn parse(&self, text: &str) -> Result<Option<String>, String> {
        if is_null_text(text, self.format.supports_nulls()) {
            return Ok(None);
        }
        Ok(Some(text.to_string()))
    }

    fn display(&self, value: Option<&String>) -> String {
        value.cloned().unwrap_or_default()
    }

    fn to_field_value(&self, value: &String) -> FieldValue {
        FieldValue::Text(value.clone())
    }

    fn from_field_value(&self, value: FieldValue) -> Result<String, FieldValue> {
        match value {
            FieldValue::Text(text) | FieldValue::Enum(text) => Ok(text),
            other => Ok(other.to_string()),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<(), ValidationIssue> {
        let text = value.to_string();
        if self.single_char && text.chars().count() > 1 {
            return Err(ValidationIssue::illegal_value("a single character is expected"));
        }
        check_text(&text, &self.format)
    }
}
