//! Utility helpers shared by the metaform crates: settings persistence,
//! message interpolation and path handling.

pub mod interpolation;
pub mod path_processing;
pub mod settings;

pub use interpolation::{format_message, parameter_count};
pub use path_processing::{expand_tilde, metaform_config_dir};
pub use settings::{FormSettings, SETTINGS_PATH_ENV, SettingsError, SettingsPayload};
