//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SUITE_INSPECTOR";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Config file from SUITE_INSPECTOR_CONFIG
    pub config_file: Option<PathBuf>,
    /// Log level from SUITE_INSPECTOR_LOG_LEVEL
    pub log_level: Option<String>,
    /// Comma-separated export keys from SUITE_INSPECTOR_EXPORT_KEYS
    pub export_keys: Option<Vec<String>>,
    /// Retry quoting from SUITE_INSPECTOR_ESCAPE_QUOTES
    pub escape_quotes: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            config_file: get_env("CONFIG").map(PathBuf::from),
            log_level: get_env("LOG_LEVEL"),
            export_keys: get_env("EXPORT_KEYS").map(|v| split_list(&v)),
            escape_quotes: get_env_bool("ESCAPE_QUOTES"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.config_file.is_some()
            || self.log_level.is_some()
            || self.export_keys.is_some()
            || self.escape_quotes.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_CONFIG:         {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_LOG_LEVEL:      {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_EXPORT_KEYS:    {:?}", ENV_PREFIX, self.export_keys);
        println!("  {}_ESCAPE_QUOTES:  {:?}", ENV_PREFIX, self.escape_quotes);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Print all SUITE_INSPECTOR environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_CONFIG          Path to configuration file");
    println!("  {ENV_PREFIX}_LOG_LEVEL       Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_EXPORT_KEYS     Comma-separated property keys to export");
    println!("  {ENV_PREFIX}_ESCAPE_QUOTES   Emit \\\" in retry queries (true/false)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_EXPORT_KEYS=Category,Owner");
    println!("  suite-inspector export suite.yaml");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sets variables for the lifetime of the guard
    struct EnvGuard {
        previous: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn set(vars: &[(&str, &str)]) -> Self {
            let previous = vars
                .iter()
                .map(|(name, value)| {
                    let key = format!("{ENV_PREFIX}_{name}");
                    let old = env::var(&key).ok();
                    env::set_var(&key, value);
                    (key, old)
                })
                .collect();
            Self { previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.previous {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.log_level.is_none());
        assert!(!config.has_any());
    }

    #[test]
    fn test_env_load() {
        let _guard = EnvGuard::set(&[
            ("LOG_LEVEL", "debug"),
            ("EXPORT_KEYS", "Category, Owner,,"),
            ("ESCAPE_QUOTES", "yes"),
        ]);

        let config = EnvConfig::load();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(
            config.export_keys,
            Some(vec!["Category".to_string(), "Owner".to_string()])
        );
        assert_eq!(config.escape_quotes, Some(true));
        assert!(config.has_any());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("A,B"), vec!["A", "B"]);
        assert!(split_list(" , ").is_empty());
    }
}
