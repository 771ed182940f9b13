use metaform_types::{FieldMetadata, FieldValue, ValidationIssue, ValueType};

use super::FieldKind;

/// Choice among the constants of an enumeration.
///
/// The value is the constant name; the first constant is the initial value.
#[derive(Debug, Clone)]
pub struct EnumKind {
    constants: Vec<String>,
}

impl EnumKind {
    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    fn constant(&self, text: &str) -> Result<String, String> {
        let trimmed = text.trim();
        self.constants
            .iter()
            .find(|constant| constant.as_str() == trimmed)
            .cloned()
            .ok_or_else(|| format!("unknown constant [{}], expected one of {}", trimmed, self.constants.join(", ")))
    }
}

impl FieldKind for EnumKind {
    type Value = String;

    const VALID_TYPES: &'static [ValueType] = &[ValueType::Enum(Vec::new())];
    const NAME: &'static str = "enum";

    fn from_metadata(metadata: &FieldMetadata) -> Self {
        let constants = match metadata.value_type() {
            ValueType::Enum(constants) => constants.clone(),
            _ => Vec::new(),
        };
        Self { constants }
    }

    fn initial_value(&self) -> Option<String> {
        self.constants.first().cloned()
    }

    fn parse(&self, text: &str) -> Result<Option<String>, String> {
        self.constant(text).map(Some)
    }

    fn display(&self, value: Option<&String>) -> String {
        value.cloned().unwrap_or_default()
    }

    fn to_field_value(&self, value: &String) -> FieldValue {
        FieldValue::Enum(value.clone())
    }

    fn from_field_value(&self, value: FieldValue) -> Result<String, FieldValue> {
        match value {
            FieldValue::Enum(name) | FieldValue::Text(name) => match self.constant(&name) {
                Ok(constant) => Ok(constant),
                Err(_) => Err(FieldValue::Enum(name)),
            },
            other => Err(other),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<(), ValidationIssue> {
        match value {
            FieldValue::Enum(name) | FieldValue::Text(name) => {
                self.constant(name).map(|_| ()).map_err(ValidationIssue::illegal_value)
            }
            _ => Err(ValidationIssue::illegal_type("enum")),
        }
    }
}
