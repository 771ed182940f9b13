//! Terminal widget backing a bound field.

use metaform_binding::{FieldStyle, Highlight, Presentation, WidgetAdapter};
use metaform_types::Alignment;

use super::common::TextInputState;

/// Text input plus the presentation state a bound field pushes into it.
#[derive(Debug, Clone, Default)]
pub struct TerminalWidget {
    pub input: TextInputState,
    invalid: bool,
    tooltip: Option<String>,
    highlight: Highlight,
    presentation: Option<Presentation>,
}

impl TerminalWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    pub fn style(&self) -> FieldStyle {
        self.presentation.as_ref().map(|p| p.style).unwrap_or_default()
    }

    pub fn alignment(&self) -> Alignment {
        self.presentation.as_ref().map(|p| p.alignment).unwrap_or_default()
    }

    /// Requested width in columns, if the format fixes one.
    pub fn columns(&self) -> Option<usize> {
        self.presentation.as_ref().and_then(|p| p.columns)
    }

    pub fn is_editable(&self) -> bool {
        self.presentation.as_ref().is_none_or(|p| p.editable)
    }
}

impl WidgetAdapter for TerminalWidget {
    fn text(&self) -> String {
        self.input.input().to_string()
    }

    fn set_text(&mut self, text: &str) {
        self.input.set_input(text);
    }

    fn select_all(&mut self) {
        self.input.select_all();
    }

    fn set_invalid_marker(&mut self, invalid: bool) {
        self.invalid = invalid;
    }

    fn set_tooltip(&mut self, tooltip: Option<&str>) {
        self.tooltip = tooltip.map(str::to_string);
    }

    fn set_highlight(&mut self, highlight: Highlight) {
        self.highlight = highlight;
    }

    fn apply_presentation(&mut self, presentation: &Presentation) {
        self.presentation = Some(presentation.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use metaform_binding::{AcceptAll, BoundField, CatalogLocalizer, FieldHandle, NumericKind};
    use metaform_types::{FieldMetadata, FieldValue, ValueType};

    fn price(format: &str) -> BoundField<NumericKind, TerminalWidget> {
        let metadata = FieldMetadata::new("price", ValueType::Double).with_format(format).unwrap();
        BoundField::new(metadata, Rc::new(AcceptAll), Rc::new(CatalogLocalizer::new()), TerminalWidget::new()).unwrap()
    }

    #[test]
    fn presentation_follows_format() {
        let field = price("8.2m>");
        let widget = field.widget();
        assert_eq!(widget.style(), FieldStyle::Mandatory);
        assert_eq!(widget.alignment(), Alignment::Right);
        assert_eq!(widget.columns(), Some(8));
        assert!(widget.is_editable());
        assert_eq!(widget.text(), "0.00");
    }

    #[test]
    fn typed_keys_reach_the_field() {
        let mut field = price("8.2s");
        field.on_shown();
        field.on_focus_gained();
        assert!(field.widget().input.is_selected());
        for c in "12.5".chars() {
            field.widget_mut().input.insert_char(c);
        }
        field.on_edit();
        field.on_focus_lost();
        assert_eq!(field.value(), Some(FieldValue::Numeric(12.5)));
        assert_eq!(field.raw_data().as_deref(), Some("12.50"));
    }
}
