//! Value model shared by fields, monitors and form records.
//!
//! `ValueType` is the declared type of a metadata node (what the model
//! stores), while `FieldValue` is the dynamic value exchanged between a
//! field and its monitor.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use url::Url;

/// Declared type of a metadata node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Char,
    Uri,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
    Date,
    Timestamp,
    /// Enumeration with its constants in declaration order.
    Enum(Vec<String>),
}

impl ValueType {
    /// Returns `true` when `self` matches `accepted`, ignoring enum constants.
    ///
    /// Field kinds declare `Enum(vec![])` to accept any enumeration.
    pub fn is_compatible_with(&self, accepted: &ValueType) -> bool {
        match (self, accepted) {
            (ValueType::Enum(_), ValueType::Enum(_)) => true,
            (left, right) => left == right,
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            ValueType::Byte | ValueType::Short | ValueType::Int | ValueType::Long | ValueType::BigInteger
        )
    }

    pub fn is_fractional(&self) -> bool {
        matches!(self, ValueType::Float | ValueType::Double | ValueType::BigDecimal)
    }

    /// Inclusive range representable by an integral type.
    pub fn integral_range(&self) -> Option<(i64, i64)> {
        match self {
            ValueType::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            ValueType::Short => Some((i16::MIN as i64, i16::MAX as i64)),
            ValueType::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            ValueType::Long | ValueType::BigInteger => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Canonical lower-case name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Char => "char",
            ValueType::Uri => "uri",
            ValueType::Boolean => "boolean",
            ValueType::Byte => "byte",
            ValueType::Short => "short",
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::BigInteger => "big_integer",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::BigDecimal => "big_decimal",
            ValueType::Date => "date",
            ValueType::Timestamp => "timestamp",
            ValueType::Enum(_) => "enum",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dynamic value exchanged on the monitor boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Boolean(bool),
    Integer(i64),
    Numeric(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    /// Name of an enumeration constant.
    Enum(String),
    Uri(Url),
}

impl FieldValue {
    /// Short name of the variant, used in type mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Numeric(_) => "numeric",
            FieldValue::Date(_) => "date",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Enum(_) => "enum",
            FieldValue::Uri(_) => "uri",
        }
    }

    /// Sign of a numeric value: -1, 0 or 1. Non-numeric values are 0.
    pub fn signum(&self) -> i32 {
        match self {
            FieldValue::Integer(value) => value.signum() as i32,
            FieldValue::Numeric(value) if *value > 0.0 => 1,
            FieldValue::Numeric(value) if *value < 0.0 => -1,
            _ => 0,
        }
    }

    /// Returns `true` for text-like values whose trimmed content is empty.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) | FieldValue::Enum(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) | FieldValue::Enum(text) => f.write_str(text),
            FieldValue::Boolean(value) => write!(f, "{}", value),
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Numeric(value) => write!(f, "{}", value),
            FieldValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            FieldValue::Timestamp(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            FieldValue::Uri(value) => f.write_str(value.as_str()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Numeric(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<Url> for FieldValue {
    fn from(value: Url) -> Self {
        FieldValue::Uri(value)
    }
}
