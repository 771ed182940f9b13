use metaform_types::{FieldMetadata, FieldValue, ValidationIssue, ValueType};

use super::FieldKind;

/// Check box semantics: the widget text is the literal `true` or `false`.
#[derive(Debug, Clone, Default)]
pub struct BooleanKind;

impl BooleanKind {
    fn literal(text: &str) -> Option<bool> {
        match text.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

impl FieldKind for BooleanKind {
    type Value = bool;

    const VALID_TYPES: &'static [ValueType] = &[ValueType::Boolean];
    const NAME: &'static str = "boolean";

    fn from_metadata(_metadata: &FieldMetadata) -> Self {
        BooleanKind
    }

    fn initial_value(&self) -> Option<bool> {
        Some(false)
    }

    fn parse(&self, text: &str) -> Result<Option<bool>, String> {
        Self::literal(text)
            .map(Some)
            .ok_or_else(|| format!("'{}' is neither true nor false", text))
    }

    fn display(&self, value: Option<&bool>) -> String {
        value.copied().unwrap_or(false).to_string()
    }

    fn to_field_value(&self, value: &bool) -> FieldValue {
        FieldValue::Boolean(*value)
    }

    fn from_field_value(&self, value: FieldValue) -> Result<bool, FieldValue> {
        match value {
            FieldValue::Boolean(flag) => Ok(flag),
            FieldValue::Text(text) => Self::literal(&text).ok_or(FieldValue::Text(text)),
            other => Err(other),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<(), ValidationIssue> {
        match value {
            FieldValue::Boolean(_) => Ok(()),
            FieldValue::Text(text) if Self::literal(text).is_some() => Ok(()),
            _ => Err(ValidationIssue::NeitherTrueNorFalse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literals_only() {
        assert_eq!(BooleanKind.parse("true").unwrap(), Some(true));
        assert_eq!(BooleanKind.parse(" false ").unwrap(), Some(false));
        assert!(BooleanKind.parse("yes").is_err());
    }

    #[test]
    fn check_rejects_other_values() {
        assert!(BooleanKind.check(&FieldValue::Boolean(true)).is_ok());
        assert!(BooleanKind.check(&FieldValue::from("false")).is_ok());
        assert_eq!(
            BooleanKind.check(&FieldValue::from("maybe")),
            Err(ValidationIssue::NeitherTrueNorFalse)
        );
        assert_eq!(
            BooleanKind.check(&FieldValue::Integer(1)),
            Err(ValidationIssue::NeitherTrueNorFalse)
        );
    }
}
