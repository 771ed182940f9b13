//! String catalogs for labels, tooltips and validation messages.
//!
//! A [`Localizer`] resolves resource keys for the current locale. The
//! [`CatalogLocalizer`] keeps one string table per locale, loaded from JSON
//! or YAML documents shaped as `{ "<locale>": { "<key>": "<text>" } }`, and
//! always knows the built-in validation messages.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::{Rc, Weak};

use heck::ToTitleCase;
use indexmap::IndexMap;
use metaform_types::validation::{
    VALIDATION_ILLEGAL_TYPE, VALIDATION_ILLEGAL_VALUE, VALIDATION_MANDATORY, VALIDATION_NEITHER_TRUE_NOR_FALSE,
    VALIDATION_NULL_VALUE,
};
use metaform_types::{FieldMetadata, ValidationIssue};
use metaform_util::format_message;
use tracing::{debug, warn};

use crate::error::LocalizationError;

/// Locale used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "en";

const BUILT_IN_MESSAGES: &[(&str, &str)] = &[
    (VALIDATION_NULL_VALUE, "Field '{0}' can't be empty"),
    (VALIDATION_MANDATORY, "Field '{0}' is mandatory and must be filled"),
    (VALIDATION_NEITHER_TRUE_NOR_FALSE, "Field '{0}' accepts only 'true' or 'false'"),
    (VALIDATION_ILLEGAL_TYPE, "Field '{0}' requires a value of type {1}"),
    (VALIDATION_ILLEGAL_VALUE, "Field '{0}' has an illegal value: {1}"),
];

/// Resolves resource keys for the current locale.
pub trait Localizer {
    /// Locale tag the strings are currently resolved for.
    fn current_locale(&self) -> String;

    /// Localized string for `key`.
    fn value(&self, key: &str) -> Result<String, LocalizationError>;

    fn contains_key(&self, key: &str) -> bool {
        self.value(key).is_ok()
    }
}

/// Receives locale switches from a [`CatalogLocalizer`].
pub trait LocaleChangeListener {
    fn locale_changed(&self, old_locale: &str, new_locale: &str);
}

type Table = HashMap<String, String>;

/// Localizer backed by in-memory per-locale tables.
pub struct CatalogLocalizer {
    tables: IndexMap<String, Table>,
    current: RefCell<String>,
    listeners: RefCell<Vec<Weak<dyn LocaleChangeListener>>>,
}

impl Default for CatalogLocalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogLocalizer {
    /// Localizer with no custom strings; only built-in messages resolve.
    pub fn new() -> Self {
        Self {
            tables: IndexMap::new(),
            current: RefCell::new(DEFAULT_LOCALE.to_string()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, LocalizationError> {
        let tables: IndexMap<String, Table> = serde_json::from_str(source)?;
        Ok(Self::from_tables(tables))
    }

    pub fn from_yaml_str(source: &str) -> Result<Self, LocalizationError> {
        let tables: IndexMap<String, Table> = serde_yaml::from_str(source)?;
        Ok(Self::from_tables(tables))
    }

    /// Load a catalog file; `.yaml`/`.yml` are read as YAML, anything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self, LocalizationError> {
        let source = fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let localizer = if is_yaml {
            Self::from_yaml_str(&source)?
        } else {
            Self::from_json_str(&source)?
        };
        debug!(path = %path.display(), locales = localizer.tables.len(), "loaded string catalog");
        Ok(localizer)
    }

    fn from_tables(tables: IndexMap<String, Table>) -> Self {
        let initial = if tables.contains_key(DEFAULT_LOCALE) || tables.is_empty() {
            DEFAULT_LOCALE.to_string()
        } else {
            tables.keys().next().cloned().unwrap_or_else(|| DEFAULT_LOCALE.to_string())
        };
        Self {
            tables,
            current: RefCell::new(initial),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Add or replace a single string.
    pub fn insert(&mut self, locale: &str, key: impl Into<String>, text: impl Into<String>) {
        self.tables
            .entry(locale.to_string())
            .or_default()
            .insert(key.into(), text.into());
    }

    /// Locales with at least one custom string.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn add_listener(&self, listener: Weak<dyn LocaleChangeListener>) {
        self.listeners.borrow_mut().push(listener);
    }

    /// Switch locale and notify live listeners. Dropped listeners are pruned.
    pub fn set_locale(&self, locale: &str) -> Result<(), LocalizationError> {
        if locale != DEFAULT_LOCALE && !self.tables.contains_key(locale) {
            return Err(LocalizationError::UnknownLocale {
                locale: locale.to_string(),
            });
        }
        let old = self.current.replace(locale.to_string());
        if old == locale {
            return Ok(());
        }
        debug!(old_locale = %old, new_locale = %locale, "locale changed");

        let live: Vec<Rc<dyn LocaleChangeListener>> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|listener| listener.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            listener.locale_changed(&old, locale);
        }
        Ok(())
    }
}

impl Localizer for CatalogLocalizer {
    fn current_locale(&self) -> String {
        self.current.borrow().clone()
    }

    fn value(&self, key: &str) -> Result<String, LocalizationError> {
        let locale = self.current.borrow();
        if let Some(text) = self.tables.get(locale.as_str()).and_then(|table| table.get(key)) {
            return Ok(text.clone());
        }
        if let Some((_, text)) = BUILT_IN_MESSAGES.iter().find(|(id, _)| *id == key) {
            return Ok((*text).to_string());
        }
        Err(LocalizationError::MissingKey {
            key: key.to_string(),
            locale: locale.clone(),
        })
    }
}

/// Human readable label of a field: the localized label, or the label id
/// turned into title case when the catalog lacks it.
pub fn localized_label(localizer: &dyn Localizer, metadata: &FieldMetadata) -> String {
    localizer
        .value(metadata.label_id())
        .unwrap_or_else(|_| metadata.label_id().to_title_case())
}

/// Build the diagnostic for a standard validation failure.
///
/// The template receives the field label as `{0}` and the issue parameter as
/// `{1}`. When the label can't be resolved the message degrades to
/// `<template>: (<label id>)`.
pub fn validation_message(localizer: &dyn Localizer, metadata: &FieldMetadata, issue: &ValidationIssue) -> String {
    let template = match localizer.value(issue.message_key()) {
        Ok(template) => template,
        Err(error) => {
            warn!(key = issue.message_key(), %error, "validation template missing");
            issue.message_key().to_string()
        }
    };
    match localizer.value(metadata.label_id()) {
        Ok(label) => {
            let parameter = issue.parameter().unwrap_or_default();
            format_message(&template, &[label.as_str(), parameter])
        }
        Err(_) => format!("{}: ({})", template, metadata.label_id()),
    }
}
