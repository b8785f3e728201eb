//! Configuration module for metric-bridge.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, CatalogSettings, Settings, SettingsError, ValidationSettings,
    CONFIG_ENV_VAR, LOCAL_CONFIG_FILE,
};
