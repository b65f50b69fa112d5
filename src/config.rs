//! Runtime configuration read from the environment.
//!
//! Every value has a default, so a missing variable is never an error. A
//! variable that is present but unparseable yields a [`ConfigError`] which
//! `main` logs; that field alone keeps its default.

use std::env;
use std::path::PathBuf;

use crate::storage::FileStorage;

pub const DATA_DIR_VAR: &str = "CHARGESENSE_DATA_DIR";
pub const LOG_LEVEL_VAR: &str = "CHARGESENSE_LOG_LEVEL";
pub const MEMORY_STORAGE_VAR: &str = "CHARGESENSE_MEMORY_STORAGE";

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
    InvalidFlag { var: &'static str, value: String },
    EmptyPath(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidLogLevel(v) => {
                write!(f, "Invalid {LOG_LEVEL_VAR}: {v:?} (expected one of {})", LEVELS.join("|"))
            }
            ConfigError::InvalidFlag { var, value } => {
                write!(f, "Invalid {var}: {value:?} (expected 1/0, true/false, yes/no)")
            }
            ConfigError::EmptyPath(var) => write!(f, "{var} is set but empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub memory_storage: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: FileStorage::default_dir(),
            log_level: "info".to_string(),
            memory_storage: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> (Self, Vec<ConfigError>) {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Each invalid variable is
    /// reported and leaves only its own field at the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigError>) {
        let mut config = AppConfig::default();
        let mut errors = Vec::new();

        if let Some(dir) = lookup(DATA_DIR_VAR) {
            if dir.trim().is_empty() {
                errors.push(ConfigError::EmptyPath(DATA_DIR_VAR));
            } else {
                config.data_dir = PathBuf::from(dir);
            }
        }

        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            let level = level.trim().to_ascii_lowercase();
            if LEVELS.contains(&level.as_str()) {
                config.log_level = level;
            } else {
                errors.push(ConfigError::InvalidLogLevel(level));
            }
        }

        if let Some(flag) = lookup(MEMORY_STORAGE_VAR) {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.memory_storage = true,
                "0" | "false" | "no" | "" => config.memory_storage = false,
                _ => errors.push(ConfigError::InvalidFlag {
                    var: MEMORY_STORAGE_VAR,
                    value: flag,
                }),
            }
        }

        (config, errors)
    }

    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  {DATA_DIR_VAR}       : {}", self.data_dir.display());
        tracing::info!("  {LOG_LEVEL_VAR}      : {}", self.log_level);
        tracing::info!("  {MEMORY_STORAGE_VAR} : {}", self.memory_storage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let (config, errors) = AppConfig::from_lookup(lookup(&[]));
        assert!(errors.is_empty());
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_level, "info");
        assert!(!config.memory_storage);
        assert!(config.data_dir.ends_with("ChargeSense"));
    }

    #[test]
    fn test_all_values_read() {
        let (config, errors) = AppConfig::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/tmp/cs"),
            (LOG_LEVEL_VAR, "DEBUG"),
            (MEMORY_STORAGE_VAR, "yes"),
        ]));
        assert!(errors.is_empty());
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cs"));
        assert_eq!(config.log_level, "debug");
        assert!(config.memory_storage);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let (config, errors) = AppConfig::from_lookup(lookup(&[(LOG_LEVEL_VAR, "loud")]));
        assert_eq!(errors, vec![ConfigError::InvalidLogLevel("loud".into())]);
        assert_eq!(config, AppConfig::default());

        let (_, errors) = AppConfig::from_lookup(lookup(&[(MEMORY_STORAGE_VAR, "maybe")]));
        assert!(matches!(errors.as_slice(), [ConfigError::InvalidFlag { .. }]));

        let (_, errors) = AppConfig::from_lookup(lookup(&[(DATA_DIR_VAR, "  ")]));
        assert_eq!(errors, vec![ConfigError::EmptyPath(DATA_DIR_VAR)]);
    }

    #[test]
    fn test_invalid_value_keeps_other_fields() {
        let (config, errors) = AppConfig::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/srv/chargesense"),
            (LOG_LEVEL_VAR, "chatty"),
            (MEMORY_STORAGE_VAR, "perhaps"),
        ]));
        assert_eq!(errors.len(), 2);
        assert_eq!(config.data_dir, PathBuf::from("/srv/chargesense"));
        assert_eq!(config.log_level, "info");
        assert!(!config.memory_storage);

        let (config, errors) =
            AppConfig::from_lookup(lookup(&[(DATA_DIR_VAR, ""), (MEMORY_STORAGE_VAR, "1")]));
        assert_eq!(errors, vec![ConfigError::EmptyPath(DATA_DIR_VAR)]);
        assert_eq!(config.data_dir, FileStorage::default_dir());
        assert!(config.memory_storage);
    }
}
