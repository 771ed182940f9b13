//! Declarative checks shared by every field kind.
//!
//! These routines are monitor independent: they only look at the value and
//! the field format. Localized diagnostics are built by the caller from the
//! returned [`ValidationIssue`].

use crate::format::FieldFormat;
use crate::mask::matches_mask;
use crate::value::{FieldValue, ValueType};

pub const VALIDATION_NULL_VALUE: &str = "metaform.validation.nullvalue";
pub const VALIDATION_MANDATORY: &str = "metaform.validation.mandatory";
pub const VALIDATION_NEITHER_TRUE_NOR_FALSE: &str = "metaform.validation.neithertruenorfalse";
pub const VALIDATION_ILLEGAL_TYPE: &str = "metaform.validation.illegaltype";
pub const VALIDATION_ILLEGAL_VALUE: &str = "metaform.validation.illegalvalue";

/// Reason a candidate value failed standard validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    NullValue,
    Mandatory,
    NeitherTrueNorFalse,
    IllegalType { expected: String },
    IllegalValue { reason: String },
}

impl ValidationIssue {
    /// Resource key of the message template for this issue.
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationIssue::NullValue => VALIDATION_NULL_VALUE,
            ValidationIssue::Mandatory => VALIDATION_MANDATORY,
            ValidationIssue::NeitherTrueNorFalse => VALIDATION_NEITHER_TRUE_NOR_FALSE,
            ValidationIssue::IllegalType { .. } => VALIDATION_ILLEGAL_TYPE,
            ValidationIssue::IllegalValue { .. } => VALIDATION_ILLEGAL_VALUE,
        }
    }

    /// Extra template parameter, after the field label.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            ValidationIssue::IllegalType { expected } => Some(expected),
            ValidationIssue::IllegalValue { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn illegal_value(reason: impl Into<String>) -> Self {
        ValidationIssue::IllegalValue { reason: reason.into() }
    }

    pub fn illegal_type(expected: impl Into<String>) -> Self {
        ValidationIssue::IllegalType { expected: expected.into() }
    }
}

/// Null and mandatory checks applied before any kind-specific rule.
///
/// Returns `Ok(None)` when the value is an accepted null, `Ok(Some(value))`
/// when further checks should run.
pub fn check_presence<'a>(
    value: Option<&'a FieldValue>,
    format: &FieldFormat,
) -> Result<Option<&'a FieldValue>, ValidationIssue> {
    match value {
        None if format.supports_nulls() => Ok(None),
        None => Err(ValidationIssue::NullValue),
        Some(present) if format.is_mandatory() && present.is_blank() => Err(ValidationIssue::Mandatory),
        Some(present) => Ok(Some(present)),
    }
}

/// Length and mask rules for text content.
pub fn check_text(text: &str, format: &FieldFormat) -> Result<(), ValidationIssue> {
    if format.length() > 0 && text.chars().count() > format.length() {
        return Err(ValidationIssue::illegal_value(format!(
            "value must be at most {} characters",
            format.length()
        )));
    }
    if let Some(mask) = format.mask()
        && !text.is_empty()
        && !matches_mask(mask, text)
    {
        return Err(ValidationIssue::illegal_value(format!("value must match the mask {}", mask)));
    }
    Ok(())
}

/// Range check for integral declared types.
pub fn check_integral_range(value: i64, value_type: &ValueType) -> Result<(), ValidationIssue> {
    match value_type.integral_range() {
        Some((min, max)) if value < min || value > max => Err(ValidationIssue::illegal_value(format!(
            "value {} is out of range [{}..{}] for {}",
            value, min, max, value_type
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(value_type: &ValueType, source: &str) -> FieldFormat {
        FieldFormat::parse(value_type, source).unwrap()
    }

    #[test]
    fn null_rejected_unless_supported() {
        let strict = format(&ValueType::String, "");
        let nullable = format(&ValueType::String, "N");
        assert_eq!(check_presence(None, &strict), Err(ValidationIssue::NullValue));
        assert_eq!(check_presence(None, &nullable), Ok(None));
    }

    #[test]
    fn mandatory_rejects_blank_text() {
        let mandatory = format(&ValueType::String, "m");
        let blank = FieldValue::Text("   ".into());
        assert_eq!(check_presence(Some(&blank), &mandatory), Err(ValidationIssue::Mandatory));
        let filled = FieldValue::Text("x".into());
        assert!(check_presence(Some(&filled), &mandatory).is_ok());
    }

    #[test]
    fn text_length_and_mask() {
        let limited = format(&ValueType::String, "3");
        assert!(check_text("abc", &limited).is_ok());
        assert!(check_text("abcd", &limited).is_err());

        let masked = format(&ValueType::String, "(##-##)");
        assert!(check_text("12-34", &masked).is_ok());
        assert!(check_text("1234", &masked).is_err());
    }

    #[test]
    fn integral_range_by_width() {
        assert!(check_integral_range(127, &ValueType::Byte).is_ok());
        assert!(check_integral_range(128, &ValueType::Byte).is_err());
        assert!(check_integral_range(i64::MAX, &ValueType::Long).is_ok());
    }

    #[test]
    fn issue_keys_and_parameters() {
        let issue = ValidationIssue::illegal_type("uri");
        assert_eq!(issue.message_key(), VALIDATION_ILLEGAL_TYPE);
        assert_eq!(issue.parameter(), Some("uri"));
        assert_eq!(ValidationIssue::Mandatory.parameter(), None);
    }
}
