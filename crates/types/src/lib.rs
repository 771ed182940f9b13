//! Shared type definitions for metaform: values, declared types, field
//! formats, metadata descriptors and monitor events.

pub mod event;
pub mod format;
pub mod mask;
pub mod metadata;
pub mod validation;
pub mod value;

pub use event::{MonitorEvent, RefreshMode};
pub use format::{Alignment, ContentType, FieldFormat, FormatError, MAX_LENGTH, PrintMode};
pub use metadata::{FieldMetadata, FieldMetadataDef};
pub use validation::{ValidationIssue, check_integral_range, check_presence, check_text};
pub use value::{FieldValue, ValueType};
