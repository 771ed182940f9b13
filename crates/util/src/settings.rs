//! Persistent form settings.
//!
//! A tiny JSON-backed store for user level configuration: preferred locale,
//! tooltip behavior and the log filter used by the CLI. The file lives in
//! the standard configuration directory (`~/.config/metaform/settings.json`
//! on most platforms) unless `METAFORM_SETTINGS_PATH` points elsewhere.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{expand_tilde, metaform_config_dir};

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "METAFORM_SETTINGS_PATH";

/// Default filename for the JSON payload.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Error surfaced when reading or writing settings fails.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted setting values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPayload {
    /// Locale used to resolve labels, tooltips and validation messages.
    pub locale: String,
    /// Whether the tooltip of the focused field is shown in the status line.
    pub tooltips_on_focus: bool,
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for SettingsPayload {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            tooltips_on_focus: true,
            log_filter: "info".to_string(),
        }
    }
}

/// Settings store backed by a JSON file.
#[derive(Debug, Default)]
pub struct FormSettings {
    path: PathBuf,
    payload: Mutex<SettingsPayload>,
    persist_to_disk: bool,
}

impl FormSettings {
    /// Load settings from the default location.
    pub fn new() -> Result<Self, SettingsError> {
        Self::at(default_settings_path())
    }

    /// Load settings from an explicit path. A missing file yields defaults.
    pub fn at(path: PathBuf) -> Result<Self, SettingsError> {
        let payload = load_payload(&path)?;
        Ok(Self {
            path,
            payload: Mutex::new(payload),
            persist_to_disk: true,
        })
    }

    /// In-memory store used when the config directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: Mutex::new(SettingsPayload::default()),
            persist_to_disk: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current values.
    pub fn snapshot(&self) -> SettingsPayload {
        self.payload.lock().expect("settings lock poisoned").clone()
    }

    pub fn locale(&self) -> String {
        self.payload.lock().expect("settings lock poisoned").locale.clone()
    }

    pub fn set_locale(&self, locale: impl Into<String>) -> Result<(), SettingsError> {
        self.update(|payload| payload.locale = locale.into())
    }

    pub fn set_tooltips_on_focus(&self, enabled: bool) -> Result<(), SettingsError> {
        self.update(|payload| payload.tooltips_on_focus = enabled)
    }

    fn update(&self, apply: impl FnOnce(&mut SettingsPayload)) -> Result<(), SettingsError> {
        let mut payload = self.payload.lock().expect("settings lock poisoned");
        apply(&mut payload);
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(())
    }

    fn save_locked(&self, payload: &SettingsPayload) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Settings path honoring the `METAFORM_SETTINGS_PATH` override.
pub fn default_settings_path() -> PathBuf {
    if let Ok(path) = env::var(SETTINGS_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }
    metaform_config_dir().join(SETTINGS_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<SettingsPayload, SettingsError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse settings file; using defaults"
                );
                Ok(SettingsPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(SettingsPayload::default()),
        Err(error) => Err(SettingsError::Io(error)),
    }
}
