//! ANSI 256-color fallback for terminals without truecolor support.

use ratatui::style::Color;

use super::roles::{Theme, ThemeRoles};

/// Indexed-color approximation of the Nord palette.
#[derive(Debug, Clone)]
pub struct Ansi256Theme {
    roles: ThemeRoles,
}

impl Ansi256Theme {
    pub fn new() -> Self {
        Self {
            roles: ThemeRoles {
                background: Color::Indexed(236),
                surface: Color::Indexed(237),
                border: Color::Indexed(239),

                text: Color::Indexed(253),
                text_secondary: Color::Indexed(255),
                text_muted: Color::Indexed(245),

                mandatory: Color::Indexed(222),

                info: Color::Indexed(110),
                success: Color::Indexed(150),
                warning: Color::Indexed(173),
                error: Color::Indexed(167),

                selection_bg: Color::Indexed(240),
                selection_fg: Color::Indexed(255),
                focus: Color::Indexed(116),
            },
        }
    }
}

impl Default for Ansi256Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme for Ansi256Theme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}
