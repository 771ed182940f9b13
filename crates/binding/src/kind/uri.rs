use metaform_types::{FieldFormat, FieldMetadata, FieldValue, ValidationIssue, ValueType};
use url::Url;

use super::{FieldKind, is_null_text};

/// Absolute URIs, parsed with the `url` crate.
#[derive(Debug, Clone)]
pub struct UriKind {
    format: FieldFormat,
}

impl UriKind {
    fn parse_uri(text: &str) -> Result<Url, String> {
        Url::parse(text.trim()).map_err(|error| format!("'{}': {}", text.trim(), error))
    }
}

impl FieldKind for UriKind {
    type Value = Url;

    const VALID_TYPES: &'static [ValueType] = &[ValueType::Uri, ValueType::String];
    const NAME: &'static str = "uri";

    fn from_metadata(metadata: &FieldMetadata) -> Self {
        Self {
            format: metadata.effective_format(),
        }
    }

    fn parse(&self, text: &str) -> Result<Option<Url>, String> {
        if is_null_text(text, self.format.supports_nulls()) {
            return Ok(None);
        }
        Self::parse_uri(text).map(Some)
    }

    fn display(&self, value: Option<&Url>) -> String {
        value.map(|uri| uri.as_str().to_string()).unwrap_or_default()
    }

    fn to_field_value(&self, value: &Url) -> FieldValue {
        FieldValue::Uri(value.clone())
    }

    fn from_field_value(&self, value: FieldValue) -> Result<Url, FieldValue> {
        match value {
            FieldValue::Uri(uri) => Ok(uri),
            FieldValue::Text(text) => Self::parse_uri(&text).map_err(|_| FieldValue::Text(text)),
            other => Err(other),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<(), ValidationIssue> {
        match value {
            FieldValue::Uri(_) => Ok(()),
            FieldValue::Text(text) => Self::parse_uri(text).map(|_| ()).map_err(ValidationIssue::illegal_value),
            _ => Err(ValidationIssue::illegal_type("uri")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(format: &str) -> UriKind {
        UriKind::from_metadata(&FieldMetadata::new("home", ValueType::Uri).with_format(format).unwrap())
    }

    #[test]
    fn parses_absolute_uris() {
        let uri = kind("").parse("https://example.com/a").unwrap().unwrap();
        assert_eq!(uri.host_str(), Some("example.com"));
        assert!(kind("").parse("not a uri").is_err());
        assert_eq!(kind("N").parse("").unwrap(), None);
    }

    #[test]
    fn check_reports_parse_failures() {
        let home = kind("");
        assert!(home.check(&FieldValue::from("mailto:dev@example.com")).is_ok());
        assert!(matches!(
            home.check(&FieldValue::from("::")),
            Err(ValidationIssue::IllegalValue { .. })
        ));
        assert_eq!(home.check(&FieldValue::Boolean(true)), Err(ValidationIssue::illegal_type("uri")));
    }
}
