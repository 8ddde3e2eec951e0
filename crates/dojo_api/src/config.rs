//! Environment-driven runtime configuration.
//!
//! # Responsibility
//! - Resolve the store path and logging settings for endpoint callers.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - Logging starts only when a log directory is configured.

use dojo_core::default_log_level;
use std::path::PathBuf;

/// Database file path override.
pub const DB_PATH_ENV: &str = "DOJO_DB_PATH";
/// Log level override (`trace|debug|info|warn|error`).
pub const LOG_LEVEL_ENV: &str = "DOJO_LOG_LEVEL";
/// Absolute directory for rolling log files.
pub const LOG_DIR_ENV: &str = "DOJO_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "dojo.sqlite3";

/// Resolved runtime settings for opening the store and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl ApiConfig {
    /// Reads settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging is not configured.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: {}", log_dir.display()))?;
        dojo_core::init_logging(&self.log_level, log_dir)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> ApiConfig {
        let values = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        ApiConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = config_from(&[(DB_PATH_ENV, "   ")]);
        assert_eq!(config.db_path, std::env::temp_dir().join("dojo.sqlite3"));
        assert_eq!(config.log_level, dojo_core::default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed_and_used() {
        let config = config_from(&[
            (DB_PATH_ENV, " /var/lib/dojo/store.sqlite3 "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/dojo"),
        ]);
        assert_eq!(
            config.db_path,
            PathBuf::from("/var/lib/dojo/store.sqlite3")
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/dojo")));
    }

    #[test]
    fn init_logging_is_skipped_without_log_dir() {
        let config = config_from(&[]);
        assert_eq!(config.init_logging(), Ok(false));
    }
}
