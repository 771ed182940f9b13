//! Toolkit-facing side of a bound field.
//!
//! A [`WidgetAdapter`] is the only thing a field needs from a UI toolkit:
//! reading and writing text plus a few presentation hooks. [`MemoryWidget`]
//! is a headless implementation used by batch validation and tests.

use metaform_types::{Alignment, FieldFormat, FieldMetadata};

/// Visual role of a field derived from its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldStyle {
    Mandatory,
    #[default]
    Optional,
}

/// Sign highlighting requested by the format for the current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    Negative,
    Zero,
    Positive,
}

impl Highlight {
    /// Highlight for a value of the given sign, honoring the `n`/`z`/`p` format flags.
    pub fn for_sign(format: &FieldFormat, signum: i32) -> Self {
        if !format.is_highlighted(signum) {
            return Highlight::None;
        }
        match signum {
            s if s < 0 => Highlight::Negative,
            s if s > 0 => Highlight::Positive,
            _ => Highlight::Zero,
        }
    }
}

/// Presentation attributes applied once when a field is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub name: String,
    pub alignment: Alignment,
    pub style: FieldStyle,
    /// Visible width in columns; `None` lets the toolkit decide.
    pub columns: Option<usize>,
    pub rows: usize,
    pub focusable: bool,
    pub editable: bool,
    pub local_editor: bool,
}

impl Presentation {
    pub fn from_metadata(metadata: &FieldMetadata, format: &FieldFormat) -> Self {
        Self {
            name: metadata.component_name().to_string(),
            alignment: format.alignment(),
            style: if format.is_mandatory() {
                FieldStyle::Mandatory
            } else {
                FieldStyle::Optional
            },
            columns: (format.length() > 0).then(|| format.length()),
            rows: format.height(),
            focusable: !format.is_output(),
            editable: !format.is_read_only(false),
            local_editor: format.has_local_editor(),
        }
    }
}

/// Operations a bound field performs on its widget.
pub trait WidgetAdapter {
    fn text(&self) -> String;

    fn set_text(&mut self, text: &str);

    fn select_all(&mut self) {}

    /// Toggle the visual marker of an invalid value.
    fn set_invalid_marker(&mut self, _invalid: bool) {}

    fn set_tooltip(&mut self, _tooltip: Option<&str>) {}

    fn set_highlight(&mut self, _highlight: Highlight) {}

    fn apply_presentation(&mut self, _presentation: &Presentation) {}
}

/// Headless widget that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryWidget {
    pub text: String,
    pub selected: bool,
    pub invalid: bool,
    pub tooltip: Option<String>,
    pub highlight: Highlight,
    pub presentation: Option<Presentation>,
}

impl MemoryWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate user typing: replaces the content and drops the selection.
    pub fn type_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.selected = false;
    }
}

impl WidgetAdapter for MemoryWidget {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn select_all(&mut self) {
        self.selected = true;
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
