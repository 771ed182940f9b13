use metaform_types::{FieldFormat, FieldMetadata, FieldValue, ValidationIssue, ValueType, check_integral_range};

use super::{FieldKind, is_null_text};

/// Integral numbers, range checked against the declared width.
#[derive(Debug, Clone)]
pub struct IntegerKind {
    value_type: ValueType,
    format: FieldFormat,
}

impl IntegerKind {
    fn parse_number(&self, text: &str) -> Result<i64, String> {
        let number: i64 = text
            .trim()
            .parse()
            .map_err(|error| format!("'{}' is not an integer: {}", text.trim(), error))?;
        check_integral_range(number, &self.value_type).map_err(|issue| issue.parameter().unwrap_or_default().to_string())?;
        Ok(number)
    }
}

impl FieldKind for IntegerKind {
    type Value = i64;

    const VALID_TYPES: &'static [ValueType] = &[
        ValueType::Byte,
        ValueType::Short,
        ValueType::Int,
        ValueType::Long,
        ValueType::BigInteger,
    ];
    const NAME: &'static str = "integer";

    fn from_metadata(metadata: &FieldMetadata) -> Self {
        Self {
            value_type: metadata.value_type().clone(),
            format: metadata.effective_format(),
        }
    }

    fn initial_value(&self) -> Option<i64> {
        (!self.format.supports_nulls()).then_some(0)
    }

    fn parse(&self, text: &str) -> Result<Option<i64>, String> {
        if is_null_text(text, self.format.supports_nulls()) {
            return Ok(None);
        }
        self.parse_number(text).map(Some)
    }

    fn display(&self, value: Option<&i64>) -> String {
        value.map(i64::to_string).unwrap_or_default()
    }

    fn to_field_value(&self, value: &i64) -> FieldValue {
        FieldValue::Integer(*value)
    }

    fn from_field_value(&self, value: FieldValue) -> Result<i64, FieldValue> {
        match value {
            FieldValue::Integer(number) => Ok(number),
            FieldValue::Numeric(number) if number.fract() == 0.0 && number.abs() < i64::MAX as f64 => Ok(number as i64),
            FieldValue::Text(text) => self.parse_number(&text).map_err(|_| FieldValue::Text(text)),
            other => Err(other),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<(), ValidationIssue> {
        match value {
            FieldValue::Integer(number) => check_integral_range(*number, &self.value_type),
            FieldValue::Text(text) => self.parse_number(text).map(|_| ()).map_err(ValidationIssue::illegal_value),
            _ => Err(ValidationIssue::illegal_type(self.value_type.name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(value_type: ValueType) -> IntegerKind {
        IntegerKind::from_metadata(&FieldMetadata::new("count", value_type))
    }

    #[test]
    fn parse_respects_width() {
        assert_eq!(kind(ValueType::Byte).parse("127").unwrap(), Some(127));
        assert!(kind(ValueType::Byte).parse("128").is_err());
        assert!(kind(ValueType::Int).parse("12a").is_err());
    }

    #[test]
    fn check_reports_range_and_type() {
        let short = kind(ValueType::Short);
        assert!(short.check(&FieldValue::Integer(100)).is_ok());
        assert!(matches!(
            short.check(&FieldValue::Integer(40_000)),
            Err(ValidationIssue::IllegalValue { .. })
        ));
        assert_eq!(
            short.check(&FieldValue::Boolean(true)),
            Err(ValidationIssue::illegal_type("short"))
        );
    }

    #[test]
    fn whole_numeric_values_convert() {
        let long = kind(ValueType::Long);
        assert_eq!(long.from_field_value(FieldValue::Numeric(12.0)), Ok(12));
        assert!(long.from_field_value(FieldValue::Numeric(12.5)).is_err());
    }
}
