//! Per-kind value semantics.
//!
//! A [`FieldKind`] knows which declared types it can display, how widget
//! text maps to a typed value and back, and the kind specific part of the
//! standard validation. The binding protocol itself lives in
//! [`crate::field::BoundField`] and is identical for every kind.

mod boolean;
mod date;
mod enumeration;
mod integer;
mod numeric;
mod text;
mod uri;

pub use boolean::BooleanKind;
pub use date::DateKind;
pub use enumeration::EnumKind;
pub use integer::IntegerKind;
pub use numeric::NumericKind;
pub use text::TextKind;
pub use uri::UriKind;

use std::fmt;

use metaform_types::{FieldMetadata, FieldValue, ValidationIssue, ValueType};

/// Value semantics of one widget family.
pub trait FieldKind {
    type Value: Clone + PartialEq + fmt::Debug;

    /// Declared types this kind accepts. `Enum` entries match any enumeration.
    const VALID_TYPES: &'static [ValueType];

    /// Short name used in diagnostics.
    const NAME: &'static str;

    /// Build the kind for an already type-checked node.
    fn from_metadata(metadata: &FieldMetadata) -> Self
    where
        Self: Sized;

    /// Value shown before the first `Loading`.
    fn initial_value(&self) -> Option<Self::Value> {
        None
    }

    /// Parse widget text. `Ok(None)` is a null value.
    fn parse(&self, text: &str) -> Result<Option<Self::Value>, String>;

    /// Widget text for a value; `None` renders as empty.
    fn display(&self, value: Option<&Self::Value>) -> String;

    fn to_field_value(&self, value: &Self::Value) -> FieldValue;

    /// Convert a dynamic value. Returns the value back when it can't be represented.
    fn from_field_value(&self, value: FieldValue) -> Result<Self::Value, FieldValue>;

    /// Kind specific checks on a present value.
    fn check(&self, value: &FieldValue) -> Result<(), ValidationIssue>;
}

/// Returns `true` when `declared` is one of `K::VALID_TYPES`.
pub fn accepts<K: FieldKind>(declared: &ValueType) -> bool {
    K::VALID_TYPES.iter().any(|accepted| declared.is_compatible_with(accepted))
}

/// Comma separated list of accepted type names.
pub fn accepted_names<K: FieldKind>() -> String {
    K::VALID_TYPES
        .iter()
        .map(ValueType::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Empty (or blank) text is a null value when the format allows nulls.
pub(crate) fn is_null_text(text: &str, supports_nulls: bool) -> bool {
    supports_nulls && text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matches_declared_types() {
        assert!(accepts::<NumericKind>(&ValueType::BigDecimal));
        assert!(!accepts::<NumericKind>(&ValueType::String));
        assert!(accepts::<EnumKind>(&ValueType::Enum(vec!["A".into()])));
        assert!(accepts::<UriKind>(&ValueType::String));
    }

    #[test]
    fn accepted_names_lists_types() {
        assert_eq!(accepted_names::<BooleanKind>(), "boolean");
        assert_eq!(accepted_names::<TextKind>(), "string, char, uri");
    }
}
