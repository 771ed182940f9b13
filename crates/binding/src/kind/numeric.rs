use metaform_types::{FieldFormat, FieldMetadata, FieldValue, ValidationIssue, ValueType};

use super::{FieldKind, is_null_text};

/// Fraction digits shown when the format doesn't specify a precision.
/// A zero fraction (`"8"`, `"8.0"`) also falls back to it; use an integer type for whole numbers.
pub const DEFAULT_PRECISION: usize = 2;

/// Fractional numbers displayed with a fixed precision.
#[derive(Debug, Clone)]
pub struct NumericKind {
    value_type: ValueType,
    format: FieldFormat,
    precision: usize,
}

impl NumericKind {
    pub fn precision(&self) -> usize {
        self.precision
    }

    fn parse_number(&self, text: &str) -> Result<f64, String> {
        let trimmed = text.trim();
        let normalized = if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            trimmed.replacen(',', ".", 1)
        };
        let number: f64 = normalized
            .parse()
            .map_err(|_| format!("'{}' is not a number", trimmed))?;
        if !number.is_finite() {
            return Err(format!("'{}' is not a finite number", trimmed));
        }
        Ok(number)
    }

    fn check_number(&self, number: f64) -> Result<(), ValidationIssue> {
        if self.value_type == ValueType::Float && number.abs() > f32::MAX as f64 {
            return Err(ValidationIssue::illegal_value(format!("{} is out of range for float", number)));
        }
        let scaled = number * 10f64.powi(self.precision as i32);
        if (scaled - scaled.round()).abs() > 1e-6 {
            return Err(ValidationIssue::illegal_value(format!(
                "at most {} fraction digits are allowed",
                self.precision
            )));
        }
        Ok(())
    }
}

impl FieldKind for NumericKind {
    type Value = f64;

    const VALID_TYPES: &'static [ValueType] = &[ValueType::Float, ValueType::Double, ValueType::BigDecimal];
    const NAME: &'static str = "numeric";

    fn from_metadata(metadata: &FieldMetadata) -> Self {
        let format = metadata.effective_format();
        let precision = match format.precision() {
            0 => DEFAULT_PRECISION,
            precision => precision,
        };
        Self {
            value_type: metadata.value_type().clone(),
            format,
            precision,
        }
    }

    fn initial_value(&self) -> Option<f64> {
        (!self.format.supports_nulls()).then_some(0.0)
    }

    fn parse(&self, text: &str) -> Result<Option<f64>, String> {
        if is_null_text(text, self.format.supports_nulls()) {
            return Ok(None);
        }
        self.parse_number(text).map(Some)
    }

    fn display(&self, value: Option<&f64>) -> String {
        value
            .map(|number| format!("{:.*}", self.precision, number))
            .unwrap_or_default()
    }

    fn to_field_value(&self, value: &f64) -> FieldValue {
        FieldValue::Numeric(*value)
    }

    fn from_field_value(&self, value: FieldValue) -> Result<f64, FieldValue> {
        match value {
            FieldValue::Numeric(number) => Ok(number),
            FieldValue::Integer(number) => Ok(number as f64),
            FieldValue::Text(text) => self.parse_number(&text).map_err(|_| FieldValue::Text(text)),
            other => Err(other),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<(), ValidationIssue> {
        match value {
            FieldValue::Numeric(number) => self.check_number(*number),
            FieldValue::Integer(number) => self.check_number(*number as f64),
            FieldValue::Text(text) => {
                let number = self.parse_number(text).map_err(ValidationIssue::illegal_value)?;
                self.check_number(number)
            }
            _ => Err(ValidationIssue::illegal_type(self.value_type.name())),
        }
    }
}
