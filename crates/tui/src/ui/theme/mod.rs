//! Theme styling for the form view.
//!
//! A truecolor Nord palette and an ANSI 256-color fallback share the
//! semantic roles in [`roles`]. Prefer the style builders of [`Theme`] over
//! hard-coded colors.

use std::env;

use tracing::debug;

pub mod ansi256;
pub mod nord;
pub mod roles;

pub use ansi256::Ansi256Theme;
pub use nord::NordTheme;
pub use roles::{Theme, ThemeRoles};

/// Environment variable forcing the color mode (`truecolor` or `ansi256`).
pub const COLOR_MODE_ENV: &str = "METAFORM_COLOR_MODE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorCapability {
    Truecolor,
    Ansi256,
}

/// Pick the theme matching the terminal's color capability.
pub fn load() -> Box<dyn Theme> {
    match detect_color_capability() {
        ColorCapability::Truecolor => Box::new(NordTheme::new()),
        ColorCapability::Ansi256 => {
            debug!("ANSI-only terminal detected; using the indexed palette");
            Box::new(Ansi256Theme::new())
        }
    }
}

fn detect_color_capability() -> ColorCapability {
    if let Some(mode) = env::var(COLOR_MODE_ENV).ok().and_then(|value| parse_color_mode(value.trim())) {
        return mode;
    }

    let color_term = env::var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
    if color_term.contains("truecolor") || color_term.contains("24bit") {
        return ColorCapability::Truecolor;
    }

    ColorCapability::Ansi256
}

fn parse_color_mode(value: &str) -> Option<ColorCapability> {
    match value.to_ascii_lowercase().as_str() {
        "truecolor" | "24bit" => Some(ColorCapability::Truecolor),
        "ansi256" | "256" | "8bit" => Some(ColorCapability::Ansi256),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaform_binding::{FieldStyle, Highlight};
    use ratatui::style::Modifier;

    #[test]
    fn color_mode_override_wins() {
        temp_env::with_vars([(COLOR_MODE_ENV, Some("ansi256")), ("COLORTERM", Some("truecolor"))], || {
            assert_eq!(detect_color_capability(), ColorCapability::Ansi256);
        });
        temp_env::with_vars([(COLOR_MODE_ENV, None::<&str>), ("COLORTERM", Some("24bit"))], || {
            assert_eq!(detect_color_capability(), ColorCapability::Truecolor);
        });
    }

    #[test]
    fn invalid_marker_overrides_highlight() {
        let theme = NordTheme::new();
        let style = theme.value_style(Highlight::Positive, true, true);
        assert_eq!(style.fg, Some(theme.roles().error));
        assert!(style.add_modifier.contains(Modifier::REVERSED));
        assert_eq!(theme.value_style(Highlight::Negative, false, true).fg, Some(nord::A_RED));
    }

    #[test]
    fn mandatory_labels_are_bold() {
        let theme = Ansi256Theme::new();
        assert!(theme.label_style(FieldStyle::Mandatory, false).add_modifier.contains(Modifier::BOLD));
        assert!(!theme.label_style(FieldStyle::Optional, false).add_modifier.contains(Modifier::BOLD));
    }
}
