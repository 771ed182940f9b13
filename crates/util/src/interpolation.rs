//! Positional message templates.
//!
//! Templates reference parameters by index: `"Field '{0}' can't be {1}"`.
//! Placeholders without a matching parameter are left in place.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern"));

/// Substitute `{n}` placeholders with `parameters[n]`.
pub fn format_message(template: &str, parameters: &[&str]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| parameters.get(index))
                .map(|value| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Number of distinct parameters a template expects.
pub fn parameter_count(template: &str) -> usize {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps[1].parse::<usize>().ok())
        .map(|index| index + 1)
        .max()
        .unwrap_or(0)
}
