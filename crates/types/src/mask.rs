//! Input masks for formatted text fields.
//!
//! Mask characters:
//! - `#` any digit
//! - `U` upper-case letter
//! - `L` lower-case letter
//! - `A` letter or digit
//! - `?` any letter
//! - `H` hexadecimal digit
//! - `*` any character
//! - `'` escapes the next character so it is taken literally
//!
//! Every other character is a literal that must appear verbatim.

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskToken {
    Digit,
    Upper,
    Lower,
    AlphaNumeric,
    Letter,
    Hex,
    Any,
    Literal(char),
}

impl MaskToken {
    fn is_placeholder(&self) -> bool {
        !matches!(self, MaskToken::Literal(_))
    }

    fn pattern(&self) -> String {
        match self {
            MaskToken::Digit => r"\d".to_string(),
            MaskToken::Upper => r"\p{Lu}".to_string(),
            MaskToken::Lower => r"\p{Ll}".to_string(),
            MaskToken::AlphaNumeric => r"[\p{L}\d]".to_string(),
            MaskToken::Letter => r"\p{L}".to_string(),
            MaskToken::Hex => "[0-9A-Fa-f]".to_string(),
            MaskToken::Any => ".".to_string(),
            MaskToken::Literal(ch) => regex::escape(&ch.to_string()),
        }
    }
}

/// Tokenize a mask. Fails on an empty mask or a dangling escape.
pub fn parse_mask(mask: &str) -> Result<Vec<MaskToken>, String> {
    if mask.is_empty() {
        return Err("mask can't be empty".to_string());
    }
    let mut tokens = Vec::with_capacity(mask.len());
    let mut chars = mask.chars();
    while let Some(ch) = chars.next() {
        let token = match ch {
            '#' => MaskToken::Digit,
            'U' => MaskToken::Upper,
            'L' => MaskToken::Lower,
            'A' => MaskToken::AlphaNumeric,
            '?' => MaskToken::Letter,
            'H' => MaskToken::Hex,
            '*' => MaskToken::Any,
            '\'' => match chars.next() {
                Some(escaped) => MaskToken::Literal(escaped),
                None => return Err("dangling escape at the end of mask".to_string()),
            },
            literal => MaskToken::Literal(literal),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

/// Build an anchored regular expression accepting exactly the strings the mask describes.
pub fn mask_regex(mask: &str) -> Result<Regex, String> {
    let tokens = parse_mask(mask)?;
    let body: String = tokens.iter().map(MaskToken::pattern).collect();
    Regex::new(&format!("^{}$", body)).map_err(|error| error.to_string())
}

/// Returns `true` when `text` satisfies `mask`.
pub fn matches_mask(mask: &str, text: &str) -> bool {
    mask_regex(mask).map(|regex| regex.is_match(text)).unwrap_or(false)
}

/// Lay `text` into the placeholders of `mask`, copying literals verbatim.
/// Unfilled placeholders become spaces.
pub fn apply_mask(mask: &str, text: &str) -> String {
    let Ok(tokens) = parse_mask(mask) else {
        return text.to_string();
    };
    let mut source = text.chars();
    let mut result = String::with_capacity(tokens.len());
    for token in tokens {
        match token {
            MaskToken::Literal(ch) => result.push(ch),
            placeholder if placeholder.is_placeholder() => result.push(source.next().unwrap_or(' ')),
            _ => {}
        }
    }
    result
}
