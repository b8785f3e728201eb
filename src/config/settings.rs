//! TOML-based configuration for metric-bridge.
//!
//! Supports a config file (metric-bridge.toml) with environment variable
//! expansion in paths.
//!
//! Example configuration:
//! ```toml
//! [validation]
//! strict = true
//! max_hops = 2
//! recommended_hops = 2
//! workers = 4
//!
//! [catalog]
//! path = "${SEMANTIC_ROOT}/catalog.json"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::semantic::DEFAULT_MAX_HOPS;
use crate::validation::ConnectivityOptions;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "METRIC_BRIDGE_CONFIG";

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "metric-bridge.toml";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Validation behavior.
    pub validation: ValidationSettings,

    /// Where the catalog comes from.
    pub catalog: CatalogSettings,
}

/// Validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Abort on any validation error instead of skipping failing metrics.
    pub strict: bool,

    /// Join budget for reachability.
    pub max_hops: usize,

    /// Reachable measures further than this produce a warning.
    pub recommended_hops: usize,

    /// Worker threads for batch validation.
    pub workers: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            strict: true,
            max_hops: DEFAULT_MAX_HOPS,
            recommended_hops: DEFAULT_MAX_HOPS,
            workers: 1,
        }
    }
}

impl From<&ValidationSettings> for ConnectivityOptions {
    fn from(settings: &ValidationSettings) -> Self {
        Self {
            max_hops: settings.max_hops,
            recommended_hops: settings.recommended_hops,
        }
    }
}

/// Catalog location.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Path to the catalog JSON (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

impl CatalogSettings {
    /// The catalog path with environment variables expanded, if one is set.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|path| expand_env_vars(path).map(PathBuf::from))
            .transpose()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `METRIC_BRIDGE_CONFIG`
    /// 2. `./metric-bridge.toml`
    /// 3. `~/.config/metric-bridge/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("metric-bridge").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject values the validator cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.validation.max_hops == 0 {
            return Err(SettingsError::InvalidConfig(
                "validation.max_hops must be at least 1".to_string(),
            ));
        }
        if self.validation.workers == 0 {
            return Err(SettingsError::InvalidConfig(
                "validation.workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Hop limits for the connectivity validator.
    pub fn connectivity_options(&self) -> ConnectivityOptions {
        ConnectivityOptions::from(&self.validation)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A `$` not followed by a name is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next();
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                name.push(ch);
                chars.next();
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
