//! Field format descriptors.
//!
//! A format string has the shape `[(mask)][length[.frac][*height]][options]`
//! where options are single characters:
//!
//! | option | meaning |
//! |---|---|
//! | `r` | always read-only |
//! | `R` | read-only for existing records |
//! | `l` | shown in lists |
//! | `L` | shown in lists and anchored |
//! | `m` | mandatory |
//! | `N` | null is an acceptable value |
//! | `n` / `z` / `p` | highlight negative / zero / positive values |
//! | `o` | output only (not focusable) |
//! | `s` | select all content on focus |
//! | `d` | a local editor is available |
//! | `<` `>` `<>` `><` | left, right, adjusted, center alignment |

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mask::{apply_mask, parse_mask};
use crate::value::{FieldValue, ValueType};

/// Longest field length a format may declare.
pub const MAX_LENGTH: usize = u16::MAX as usize;

/// Errors raised while parsing a format string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("format [{format}]: unbalanced parentheses in the mask")]
    UnbalancedMask { format: String },

    #[error("format [{format}]: mask [{mask}]: {reason}")]
    InvalidMask { format: String, mask: String, reason: String },

    #[error("format [{format}] at pos [{pos}]: mutually exclusive options ('{first}' and '{second}')")]
    MutuallyExclusive {
        format: String,
        pos: usize,
        first: char,
        second: char,
    },

    #[error("format [{format}] at pos [{pos}]: alignment appears more than once")]
    DuplicateAlignment { format: String, pos: usize },

    #[error("format [{format}] at pos [{pos}]: field length appears more than once")]
    DuplicateLength { format: String, pos: usize },

    #[error("format [{format}] at pos [{pos}]: field length exceeds {max}")]
    LengthTooLong { format: String, pos: usize, max: usize },

    #[error("format [{format}] at pos [{pos}]: frac part is too long")]
    FractionTooLong { format: String, pos: usize },

    #[error("format [{format}] at pos [{pos}]: illegal char '{ch}'")]
    IllegalChar { format: String, pos: usize, ch: char },
}

/// Content classification derived from the declared type and the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Boolean,
    String,
    FormattedString,
    Integer,
    Numeric,
    Date,
    Timestamp,
    Enum,
    Uri,
}

impl ContentType {
    pub fn of(value_type: &ValueType, mask: Option<&str>) -> Self {
        match value_type {
            ValueType::String | ValueType::Char if mask.is_some() => ContentType::FormattedString,
            ValueType::String | ValueType::Char => ContentType::String,
            ValueType::Uri => ContentType::Uri,
            ValueType::Boolean => ContentType::Boolean,
            ValueType::Date => ContentType::Date,
            ValueType::Timestamp => ContentType::Timestamp,
            ValueType::Enum(_) => ContentType::Enum,
            other if other.is_integral() => ContentType::Integer,
            _ => ContentType::Numeric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Right,
    Center,
    Adjusted,
    #[default]
    NoMatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    SingleText,
    /// Wraps the single-text rendering in a Creole no-wiki block.
    CreoleText,
}

/// Parsed, immutable field format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFormat {
    content_type: ContentType,
    alignment: Alignment,
    length: usize,
    height: usize,
    precision: usize,
    mask: Option<String>,
    mandatory: bool,
    read_only: bool,
    read_only_on_existent: bool,
    negative_highlight: bool,
    zero_highlight: bool,
    positive_highlight: bool,
    select_on_focus: bool,
    use_in_list: bool,
    use_in_list_anchored: bool,
    output: bool,
    supports_nulls: bool,
    local_editor: bool,
}

impl FieldFormat {
    /// Default format for a declared type (no options, no length).
    pub fn for_type(value_type: &ValueType) -> Self {
        Self {
            content_type: ContentType::of(value_type, None),
            alignment: Alignment::NoMatter,
            length: 0,
            height: 1,
            precision: 0,
            mask: None,
            mandatory: false,
            read_only: false,
            read_only_on_existent: false,
            negative_highlight: false,
            zero_highlight: false,
            positive_highlight: false,
            select_on_focus: false,
            use_in_list: false,
            use_in_list_anchored: false,
            output: false,
            supports_nulls: false,
            local_editor: false,
        }
    }

    /// Parse a format string for the given declared type.
    pub fn parse(value_type: &ValueType, format: &str) -> Result<Self, FormatError> {
        let source = format.trim();
        let chars: Vec<char> = source.chars().collect();
        let mut result = Self::for_type(value_type);
        let mut pos = 0;

        if chars.first() == Some(&'(') {
            let mut depth = 0usize;
            let mut closing = None;
            for (index, ch) in chars.iter().enumerate() {
                match ch {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            closing = Some(index);
                            break;
                        }
                    }
                    _ => {}
                }
            }
            let closing = closing.ok_or_else(|| FormatError::UnbalancedMask {
                format: source.to_string(),
            })?;
            let mask: String = chars[1..closing].iter().collect();
            parse_mask(&mask).map_err(|reason| FormatError::InvalidMask {
                format: source.to_string(),
                mask: mask.clone(),
                reason,
            })?;
            result.mask = Some(mask);
            pos = closing + 1;
        }

        let exclusive = |pos: usize, first: char, second: char| FormatError::MutuallyExclusive {
            format: source.to_string(),
            pos,
            first,
            second,
        };

        while pos < chars.len() {
            match chars[pos] {
                'r' => {
                    if result.read_only_on_existent {
                        return Err(exclusive(pos, 'r', 'R'));
                    }
                    result.read_only = true;
                }
                'R' => {
                    if result.read_only {
                        return Err(exclusive(pos, 'r', 'R'));
                    }
                    result.read_only_on_existent = true;
                }
                'l' => {
                    if result.use_in_list_anchored {
                        return Err(exclusive(pos, 'l', 'L'));
                    }
                    result.use_in_list = true;
                }
                'L' => {
                    if result.use_in_list {
                        return Err(exclusive(pos, 'l', 'L'));
                    }
                    result.use_in_list_anchored = true;
                }
                'm' => result.mandatory = true,
                'n' => result.negative_highlight = true,
                'N' => result.supports_nulls = true,
                'o' => result.output = true,
                'z' => result.zero_highlight = true,
                'p' => result.positive_highlight = true,
                's' => result.select_on_focus = true,
                'd' => result.local_editor = true,
                '<' | '>' => {
                    if result.alignment != Alignment::NoMatter {
                        return Err(FormatError::DuplicateAlignment {
                            format: source.to_string(),
                            pos,
                        });
                    }
                    let paired = chars.get(pos + 1).copied();
                    result.alignment = match (chars[pos], paired) {
                        ('<', Some('>')) => {
                            pos += 1;
                            Alignment::Adjusted
                        }
                        ('>', Some('<')) => {
                            pos += 1;
                            Alignment::Center
                        }
                        ('<', _) => Alignment::Left,
                        _ => Alignment::Right,
                    };
                }
                '0'..='9' => {
                    if result.length > 0 {
                        return Err(FormatError::DuplicateLength {
                            format: source.to_string(),
                            pos,
                        });
                    }
                    let (length, next) = read_number(&chars, pos);
                    if length > MAX_LENGTH {
                        return Err(FormatError::LengthTooLong {
                            format: source.to_string(),
                            pos,
                            max: MAX_LENGTH,
                        });
                    }
                    result.length = length;
                    pos = next;
                    if chars.get(pos) == Some(&'.') {
                        let (precision, next) = read_number(&chars, pos + 1);
                        result.precision = precision;
                        pos = next;
                    }
                    if result.precision > 0 && result.precision + 1 >= result.length {
                        return Err(FormatError::FractionTooLong {
                            format: source.to_string(),
                            pos,
                        });
                    }
                    if chars.get(pos) == Some(&'*') {
                        let (height, next) = read_number(&chars, pos + 1);
                        result.height = height;
                        pos = next;
                    }
                    continue;
                }
                ch => {
                    return Err(FormatError::IllegalChar {
                        format: source.to_string(),
                        pos,
                        ch,
                    });
                }
            }
            pos += 1;
        }

        if result.mandatory && result.supports_nulls {
            return Err(exclusive(chars.len(), 'm', 'N'));
        }
        result.content_type = ContentType::of(value_type, result.mask.as_deref());
        Ok(result)
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Declared field length, 0 when not typed.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Declared height in rows, 1 when not typed.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Declared fractional digits, 0 when not typed.
    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn mask(&self) -> Option<&str> {
        self.mask.as_deref()
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn is_output(&self) -> bool {
        self.output
    }

    /// Read-only state for a record. `R` fields are editable only while the
    /// record is being created.
    pub fn is_read_only(&self, existing_record: bool) -> bool {
        self.read_only || (existing_record && self.read_only_on_existent)
    }

    /// Whether a value with the given sign must be highlighted.
    pub fn is_highlighted(&self, signum: i32) -> bool {
        match signum {
            s if s < 0 => self.negative_highlight,
            s if s > 0 => self.positive_highlight,
            _ => self.zero_highlight,
        }
    }

    pub fn select_on_focus(&self) -> bool {
        self.select_on_focus
    }

    pub fn is_used_in_list(&self) -> bool {
        self.use_in_list || self.use_in_list_anchored
    }

    pub fn is_anchored(&self) -> bool {
        self.use_in_list_anchored
    }

    pub fn supports_nulls(&self) -> bool {
        self.supports_nulls
    }

    pub fn has_local_editor(&self) -> bool {
        self.local_editor
    }

    /// Canonical format string. Parsing it yields an equal format.
    pub fn to_format_string(&self) -> String {
        let mut out = String::new();
        if let Some(mask) = &self.mask {
            out.push('(');
            out.push_str(mask);
            out.push(')');
        }
        if self.length > 0 {
            out.push_str(&self.length.to_string());
            if self.precision > 0 {
                out.push('.');
                out.push_str(&self.precision.to_string());
            }
            if self.height != 1 {
                out.push('*');
                out.push_str(&self.height.to_string());
            }
        }
        let flags = [
            (self.mandatory, 'm'),
            (self.read_only, 'r'),
            (self.read_only_on_existent, 'R'),
            (self.use_in_list, 'l'),
            (self.use_in_list_anchored, 'L'),
            (self.negative_highlight, 'n'),
            (self.zero_highlight, 'z'),
            (self.positive_highlight, 'p'),
            (self.supports_nulls, 'N'),
        ];
        out.extend(flags.iter().filter(|(set, _)| *set).map(|(_, ch)| *ch));
        out.push_str(match self.alignment {
            Alignment::Adjusted => "<>",
            Alignment::Center => "><",
            Alignment::Left => "<",
            Alignment::Right => ">",
            Alignment::NoMatter => "",
        });
        let trailing = [(self.output, 'o'), (self.select_on_focus, 's'), (self.local_editor, 'd')];
        out.extend(trailing.iter().filter(|(set, _)| *set).map(|(_, ch)| *ch));
        out
    }

    /// Render a value according to the format length, precision, mask and alignment.
    pub fn print(&self, value: &FieldValue, mode: PrintMode) -> String {
        match mode {
            PrintMode::CreoleText => format!("{{{{{{{}}}}}}}", self.print(value, PrintMode::SingleText)),
            PrintMode::SingleText => self.align(self.render(value)),
        }
    }

    fn render(&self, value: &FieldValue) -> String {
        let width = self.length;
        match (value, &self.mask) {
            (FieldValue::Integer(number), Some(mask)) => apply_mask(mask, &number.to_string()),
            (FieldValue::Numeric(number), Some(mask)) => apply_mask(mask, &format!("{:.*}", self.precision, number)),
            (FieldValue::Integer(number), None) => format!("{:>width$}", number, width = width),
            (FieldValue::Numeric(number), None) => {
                format!("{:>width$.prec$}", number, width = width, prec = self.precision)
            }
            (other, _) => other.to_string(),
        }
    }

    fn align(&self, text: String) -> String {
        let width = self.length;
        let count = text.chars().count();
        match self.alignment {
            Alignment::Right if count < width => format!("{}{}", " ".repeat(width - count), text),
            Alignment::Center if count < width => {
                let bound = " ".repeat((width - count) / 2);
                format!("{}{}{}", bound, text, bound)
            }
            Alignment::Left | Alignment::Adjusted if count < width => format!("{}{}", text, " ".repeat(width - count)),
            Alignment::NoMatter if width > 0 && count > width => text.chars().take(width).collect(),
            _ => text,
        }
    }
}

impl fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_format_string())
    }
}

fn read_number(chars: &[char], mut pos: usize) -> (usize, usize) {
    let mut value = 0usize;
    while let Some(digit) = chars.get(pos).and_then(|ch| ch.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(digit as usize);
        pos += 1;
    }
    (value, pos)
}
