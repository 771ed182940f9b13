//! Immutable per-field descriptors.

use serde::{Deserialize, Serialize};

use crate::format::{FieldFormat, FormatError};
use crate::value::ValueType;

/// Descriptor binding a field to its model node.
///
/// Metadata is created once (usually deserialized from a form description)
/// and shared by reference; fields never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldMetadataDef", into = "FieldMetadataDef")]
pub struct FieldMetadata {
    name: String,
    ui_path: Option<String>,
    value_type: ValueType,
    format: Option<FieldFormat>,
    label_id: Option<String>,
    tooltip_id: Option<String>,
    help_id: Option<String>,
    localizer: Option<String>,
}

/// Wire shape of [`FieldMetadata`]; the format is kept as its source string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMetadataDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_path: Option<String>,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localizer: Option<String>,
}

impl TryFrom<FieldMetadataDef> for FieldMetadata {
    type Error = FormatError;

    fn try_from(def: FieldMetadataDef) -> Result<Self, Self::Error> {
        let format = def
            .format
            .as_deref()
            .map(|source| FieldFormat::parse(&def.value_type, source))
            .transpose()?;
        Ok(Self {
            name: def.name,
            ui_path: def.ui_path,
            value_type: def.value_type,
            format,
            label_id: def.label,
            tooltip_id: def.tooltip,
            help_id: def.help,
            localizer: def.localizer,
        })
    }
}

impl From<FieldMetadata> for FieldMetadataDef {
    fn from(metadata: FieldMetadata) -> Self {
        Self {
            format: metadata.format.as_ref().map(FieldFormat::to_format_string),
            name: metadata.name,
            ui_path: metadata.ui_path,
            value_type: metadata.value_type,
            label: metadata.label_id,
            tooltip: metadata.tooltip_id,
            help: metadata.help_id,
            localizer: metadata.localizer,
        }
    }
}

impl FieldMetadata {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            ui_path: None,
            value_type,
            format: None,
            label_id: None,
            tooltip_id: None,
            help_id: None,
            localizer: None,
        }
    }

    /// Attach a format parsed from `source` for this node's declared type.
    pub fn with_format(mut self, source: &str) -> Result<Self, FormatError> {
        self.format = Some(FieldFormat::parse(&self.value_type, source)?);
        Ok(self)
    }

    pub fn with_label(mut self, label_id: impl Into<String>) -> Self {
        self.label_id = Some(label_id.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip_id: impl Into<String>) -> Self {
        self.tooltip_id = Some(tooltip_id.into());
        self
    }

    pub fn with_help(mut self, help_id: impl Into<String>) -> Self {
        self.help_id = Some(help_id.into());
        self
    }

    pub fn with_ui_path(mut self, ui_path: impl Into<String>) -> Self {
        self.ui_path = Some(ui_path.into());
        self
    }

    pub fn with_localizer(mut self, localizer: impl Into<String>) -> Self {
        self.localizer = Some(localizer.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Component name: the UI path without its query part, or the node name.
    pub fn component_name(&self) -> &str {
        match &self.ui_path {
            Some(path) => path.split('?').next().unwrap_or(path),
            None => &self.name,
        }
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Format explicitly associated with the node, if any.
    pub fn format(&self) -> Option<&FieldFormat> {
        self.format.as_ref()
    }

    /// Associated format, or the default format of the declared type.
    pub fn effective_format(&self) -> FieldFormat {
        self.format
            .clone()
            .unwrap_or_else(|| FieldFormat::for_type(&self.value_type))
    }

    /// Label resource key; defaults to the node name.
    pub fn label_id(&self) -> &str {
        self.label_id.as_deref().unwrap_or(&self.name)
    }

    /// Tooltip resource key, ignoring blank ids.
    pub fn tooltip_id(&self) -> Option<&str> {
        self.tooltip_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn help_id(&self) -> Option<&str> {
        self.help_id.as_deref()
    }

    /// Key of the string catalog the node's resources live in.
    pub fn localizer(&self) -> Option<&str> {
        self.localizer.as_deref()
    }

    pub fn is_mandatory(&self) -> bool {
        self.format.as_ref().is_some_and(FieldFormat::is_mandatory)
    }

    /// Null is acceptable only when the associated format says so.
    pub fn supports_nulls(&self) -> bool {
        self.format.as_ref().is_some_and(FieldFormat::supports_nulls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_form_description_entry() {
        let json = r#"{
            "name": "price",
            "ui_path": "ui:/order/price?mode=edit",
            "type": "big_decimal",
            "format": "10.2m>",
            "label": "order.price",
            "tooltip": "order.price.tt"
        }"#;
        let metadata: FieldMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.name(), "price");
        assert_eq!(metadata.component_name(), "ui:/order/price");
        assert!(metadata.is_mandatory());
        assert_eq!(metadata.format().map(|f| f.precision()), Some(2));
        assert_eq!(metadata.tooltip_id(), Some("order.price.tt"));
    }

    #[test]
    fn invalid_format_fails_deserialization() {
        let yaml = "name: code\ntype: string\nformat: rR\n";
        let parsed: Result<FieldMetadata, _> = serde_yaml::from_str(yaml);
        assert!(parsed.is_err());
    }

    #[test]
    fn defaults_fall_back_to_name_and_type_format() {
        let metadata = FieldMetadata::new("title", ValueType::String).with_tooltip("  ");
        assert_eq!(metadata.label_id(), "title");
        assert_eq!(metadata.tooltip_id(), None);
        assert!(!metadata.supports_nulls());
        assert_eq!(metadata.effective_format().length(), 0);
    }

    #[test]
    fn serializes_format_back_to_source_string() {
        let metadata = FieldMetadata::new("qty", ValueType::Int).with_format("5N").unwrap();
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["format"], "5N");
        assert_eq!(json["type"], "int");
    }
}
