use std::fmt::Debug;

use metaform_binding::{FieldStyle, Highlight};
use ratatui::style::{Color, Modifier, Style};

/// Semantic color roles used by the form view.
#[derive(Debug, Clone)]
pub struct ThemeRoles {
    pub background: Color,
    pub surface: Color,
    pub border: Color,

    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    /// Label color of mandatory fields.
    pub mandatory: Color,

    pub info: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    pub selection_bg: Color,
    pub selection_fg: Color,
    pub focus: Color,
}

/// Theme trait exposes semantic roles and the style builders of the form view.
pub trait Theme: Debug {
    fn roles(&self) -> &ThemeRoles;

    fn text_primary_style(&self) -> Style {
        Style::default().fg(self.roles().text)
    }

    fn text_muted_style(&self) -> Style {
        Style::default().fg(self.roles().text_muted)
    }

    fn border_style(&self, focused: bool) -> Style {
        let color = if focused { self.roles().focus } else { self.roles().border };
        Style::default().fg(color)
    }

    fn title_style(&self) -> Style {
        Style::default().fg(self.roles().text_secondary).add_modifier(Modifier::BOLD)
    }

    /// Label style for a field of the given style.
    fn label_style(&self, style: FieldStyle, focused: bool) -> Style {
        let base = match style {
            FieldStyle::Mandatory => Style::default().fg(self.roles().mandatory).add_modifier(Modifier::BOLD),
            FieldStyle::Optional => Style::default().fg(self.roles().text_secondary),
        };
        if focused { base.add_modifier(Modifier::UNDERLINED) } else { base }
    }

    /// Value style; the invalid marker wins over sign highlighting.
    fn value_style(&self, highlight: Highlight, invalid: bool, editable: bool) -> Style {
        if invalid {
            return Style::default()
                .fg(self.roles().error)
                .add_modifier(Modifier::REVERSED);
        }
        let color = match highlight {
            Highlight::Negative => self.roles().error,
            Highlight::Positive => self.roles().success,
            Highlight::Zero => self.roles().warning,
            Highlight::None if editable => self.roles().text,
            Highlight::None => self.roles().text_muted,
        };
        Style::default().fg(color)
    }

    fn selection_style(&self) -> Style {
        Style::default().fg(self.roles().selection_fg).bg(self.roles().selection_bg)
    }

    fn status_info(&self) -> Style {
        Style::default().fg(self.roles().info)
    }

    fn status_error(&self) -> Style {
        Style::default().fg(self.roles().error)
    }
}
