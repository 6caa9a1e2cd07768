//! Configuration module
//!
//! Handles loading and layering settings for the export and retry
//! commands: defaults, then a config file, then environment overrides.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig, ENV_PREFIX};
pub use file::{ConfigFile, CONFIG_LOCATIONS};

use serde::{Deserialize, Serialize};

use crate::export::{PropertyExporter, DEFAULT_EXPORT_FILE};
use crate::models::keys;
use crate::retry::{QuoteStyle, RetryQueryBuilder, DEFAULT_QUERY_FILE};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Export settings
    pub export: ExportConfig,

    /// Retry query settings
    pub retry: RetryConfig,

    /// Default log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export: ExportConfig::default(),
            retry: RetryConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Apply environment overrides on top of file/default values
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(level) = &env.log_level {
            self.log_level = level.clone();
        }
        if let Some(keys) = &env.export_keys {
            self.export.keys = keys.clone();
        }
        if let Some(escape) = env.escape_quotes {
            self.retry.escape_quotes = escape;
        }
        self
    }

    /// Exporter for `keys`, falling back to the configured keys when empty
    pub fn exporter(&self, keys: &[String]) -> PropertyExporter {
        let keys = if keys.is_empty() { &self.export.keys } else { keys };
        PropertyExporter::new(keys.iter().cloned()).with_category_key(&self.export.category_key)
    }

    /// Retry builder honouring the configured quoting
    pub fn retry_builder(&self, escape_quotes: bool) -> RetryQueryBuilder {
        let style = if escape_quotes || self.retry.escape_quotes {
            QuoteStyle::Escaped
        } else {
            QuoteStyle::Plain
        };
        RetryQueryBuilder::new().with_quote_style(style)
    }
}

/// Property export settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Property keys exported when none are given on the command line
    pub keys: Vec<String>,

    /// Key whose values are joined one per line
    pub category_key: String,

    /// Default output file
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            keys: vec![keys::CATEGORY.to_string(), keys::DESCRIPTION.to_string()],
            category_key: keys::CATEGORY.to_string(),
            file_name: DEFAULT_EXPORT_FILE.to_string(),
        }
    }
}

/// Retry query settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Emit `\"` around parameterized names
    pub escape_quotes: bool,

    /// Default output file
    pub file_name: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            escape_quotes: false,
            file_name: DEFAULT_QUERY_FILE.to_string(),
        }
    }
}
