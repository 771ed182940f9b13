//! Error types for field binding.

use metaform_types::ValueType;
use thiserror::Error;

/// Errors raised by field construction and value assignment.
///
/// Construction errors are fatal and surface to the integrator; the event
/// handlers never return them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("invalid node type [{declared}] for field '{field}'. Only [{accepted}] are available")]
    IncompatibleType {
        field: String,
        declared: ValueType,
        accepted: String,
    },

    #[error("field '{field}' doesn't accept null values")]
    NullNotAllowed { field: String },

    #[error("field '{field}' expects a {expected} value, got {actual}")]
    ValueMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("field '{field}': can't parse [{text}]: {reason}")]
    Syntax { field: String, text: String, reason: String },
}

/// Errors a monitor may signal while processing an event.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("content error: {message}")]
    Content { message: String },

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Localization(#[from] LocalizationError),
}

impl MonitorError {
    /// Create a content error.
    pub fn content(message: impl Into<String>) -> Self {
        Self::Content { message: message.into() }
    }
}

/// Errors related to string catalogs.
#[derive(Debug, Error)]
pub enum LocalizationError {
    #[error("no string for key [{key}] in locale [{locale}]")]
    MissingKey { key: String, locale: String },

    #[error("unknown locale [{locale}]")]
    UnknownLocale { locale: String },

    #[error("catalog parse error: {reason}")]
    Parse { reason: String },

    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for LocalizationError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse { reason: error.to_string() }
    }
}

impl From<serde_yaml::Error> for LocalizationError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Parse { reason: error.to_string() }
    }
}

/// Errors raised while assembling a form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("field '{name}' is already part of the form")]
    DuplicateField { name: String },

    #[error("unknown field '{name}'")]
    UnknownField { name: String },

    #[error(transparent)]
    Field(#[from] FieldError),
}
