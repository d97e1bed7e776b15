//! Configuration loading from TOML files
//!
//! Values are resolved in this order, later wins:
//! 1. built-in defaults
//! 2. the TOML file passed to `Config::from_file` / `Config::load_from_path`
//! 3. `PEDMON_API_URL` and `PEDMON_LOCALE` from the environment (a `.env`
//!    file in the working directory is read first)

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::labels::Locale;
use crate::source::FetchPlan;

pub const ENV_API_URL: &str = "PEDMON_API_URL";
pub const ENV_LOCALE: &str = "PEDMON_LOCALE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Backend base URL, without trailing slash.
    pub base_url: String,
    pub timeout_secs: u64,
    pub fetch_plan: FetchPlan,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            fetch_plan: FetchPlan::Window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub locale: Locale,
    /// Emit zero-count points for months without data.
    pub dense: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"pedmon_service=debug"`.
    pub level: String,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), timestamps: true }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse a config file. Missing sections and keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io { path: display.clone(), source })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse { path: display, source })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load from `path`, falling back to defaults if the file is missing or
    /// invalid, then apply environment overrides.
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let mut config = match Self::from_file(&path) {
            Ok(config) => {
                info!(path = %path.as_ref().display(), "config loaded");
                config
            }
            Err(e) => {
                warn!(error = %e, "using default configuration");
                Self::default()
            }
        };
        dotenv::dotenv().ok();
        config.apply_overrides(env::var(ENV_API_URL).ok(), env::var(ENV_LOCALE).ok());
        config
    }

    /// Apply environment-style overrides. Invalid locales are ignored.
    pub fn apply_overrides(&mut self, api_url: Option<String>, locale: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.source.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = locale {
            match raw.parse::<Locale>() {
                Ok(locale) => self.display.locale = locale,
                Err(e) => warn!(error = %e, "ignoring locale override"),
            }
        }
    }
}
