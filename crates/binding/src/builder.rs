//! Assembling forms from metadata descriptions.
//!
//! A form description is an ordered list of [`FieldMetadata`]. Each entry is
//! bound to the field kind matching its declared type, so callers that load
//! descriptions from JSON or YAML never name kinds themselves.

use std::path::Path;
use std::rc::Rc;

use metaform_types::{FieldMetadata, ValueType};
use tracing::debug;

use crate::error::{FieldError, FormError};
use crate::field::BoundField;
use crate::form::{Form, FormControl};
use crate::kind::{BooleanKind, DateKind, EnumKind, IntegerKind, NumericKind, TextKind, UriKind};
use crate::localizer::Localizer;
use crate::monitor::Monitor;
use crate::widget::WidgetAdapter;

/// Errors raised while reading a form description.
#[derive(Debug, thiserror::Error)]
pub enum DescriptionError {
    #[error("form description I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("form description parse error: {reason}")]
    Parse { reason: String },
}

impl From<serde_json::Error> for DescriptionError {
    fn from(error: serde_json::Error) -> Self {
        Self::Parse { reason: error.to_string() }
    }
}

impl From<serde_yaml::Error> for DescriptionError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Parse { reason: error.to_string() }
    }
}

/// Read a form description; `.yaml`/`.yml` files are parsed as YAML, anything else as JSON.
pub fn load_description(path: &Path) -> Result<Vec<FieldMetadata>, DescriptionError> {
    let data = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let fields = if is_yaml {
        serde_yaml::from_str(&data)?
    } else {
        serde_json::from_str(&data)?
    };
    Ok(fields)
}

/// Bind `metadata` to the field kind its declared type calls for.
///
/// `String` and `Char` nodes become text fields, `Uri` nodes URI fields.
pub fn bind_control<W: WidgetAdapter + 'static>(
    metadata: FieldMetadata,
    monitor: Rc<dyn Monitor>,
    localizer: Rc<dyn Localizer>,
    widget: W,
) -> Result<Box<dyn FormControl<W>>, FieldError> {
    let control: Box<dyn FormControl<W>> = match metadata.value_type() {
        ValueType::String | ValueType::Char => {
            Box::new(BoundField::<TextKind, W>::new(metadata, monitor, localizer, widget)?)
        }
        ValueType::Uri => Box::new(BoundField::<UriKind, W>::new(metadata, monitor, localizer, widget)?),
        ValueType::Boolean => Box::new(BoundField::<BooleanKind, W>::new(metadata, monitor, localizer, widget)?),
        ValueType::Date | ValueType::Timestamp => {
            Box::new(BoundField::<DateKind, W>::new(metadata, monitor, localizer, widget)?)
        }
        ValueType::Enum(_) => Box::new(BoundField::<EnumKind, W>::new(metadata, monitor, localizer, widget)?),
        value_type if value_type.is_integral() => {
            Box::new(BoundField::<IntegerKind, W>::new(metadata, monitor, localizer, widget)?)
        }
        _ => Box::new(BoundField::<NumericKind, W>::new(metadata, monitor, localizer, widget)?),
    };
    Ok(control)
}

impl<W: WidgetAdapter + 'static> Form<W> {
    /// Build a form with one control per description entry, all sharing `monitor`.
    pub fn from_description(
        fields: impl IntoIterator<Item = FieldMetadata>,
        monitor: Rc<dyn Monitor>,
        localizer: Rc<dyn Localizer>,
        mut widget: impl FnMut(&FieldMetadata) -> W,
    ) -> Result<Self, FormError> {
        let mut form = Form::new();
        for metadata in fields {
            let control = bind_control(metadata.clone(), monitor.clone(), localizer.clone(), widget(&metadata))?;
            form.push(control)?;
        }
        debug!(fields = form.len(), "form assembled");
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localizer::CatalogLocalizer;
    use crate::monitor::AcceptAll;
    use crate::widget::MemoryWidget;
    use tempfile::tempdir;

    fn fields() -> Vec<FieldMetadata> {
        serde_json::from_str(
            r#"[
                {"name": "title", "type": "string", "format": "m"},
                {"name": "homepage", "type": "uri"},
                {"name": "active", "type": "boolean"},
                {"name": "count", "type": "short"},
                {"name": "price", "type": "big_decimal", "format": "10.3"},
                {"name": "due", "type": "date"},
                {"name": "color", "type": {"enum": ["Red", "Green"]}}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn every_declared_type_gets_a_control() {
        let mut form = Form::from_description(
            fields(),
            Rc::new(AcceptAll),
            Rc::new(CatalogLocalizer::new()),
            |_| MemoryWidget::new(),
        )
        .unwrap();
        form.show();
        assert_eq!(form.len(), 7);
        let texts: Vec<String> = form.controls().map(|control| control.widget().text.clone()).collect();
        assert_eq!(texts, vec!["", "", "false", "0", "0.000", "", "Red"]);
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let mut fields = fields();
        fields.push(FieldMetadata::new("title", ValueType::String));
        let result = Form::from_description(
            fields,
            Rc::new(AcceptAll),
            Rc::new(CatalogLocalizer::new()),
            |_| MemoryWidget::new(),
        );
        assert!(matches!(result, Err(FormError::DuplicateField { .. })));
    }

    #[test]
    fn yaml_description_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.yml");
        std::fs::write(&path, "- name: customer\n  type: string\n  format: 40m\n  tooltip: customer.tt\n").unwrap();
        let fields = load_description(&path).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].tooltip_id(), Some("customer.tt"));
        assert!(fields[0].effective_format().is_mandatory());
    }

    #[test]
    fn malformed_description_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"[{"name": "x", "type": "string", "format": "rR"}]"#).unwrap();
        assert!(matches!(load_description(&path), Err(DescriptionError::Parse { .. })));
    }
}
