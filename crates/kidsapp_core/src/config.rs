//! Store configuration.
//!
//! # Responsibility
//! - Describe where the user database lives and how deep the worker queue is.
//! - Resolve overrides from the process environment.
//!
//! # Invariants
//! - `queue_capacity` is always at least 1.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable overriding the database file path.
pub const DB_PATH_ENV: &str = "KIDSAPP_DB_PATH";
/// Environment variable overriding the worker queue capacity.
pub const QUEUE_CAPACITY_ENV: &str = "KIDSAPP_WRITE_QUEUE_CAPACITY";

pub const DEFAULT_DB_FILE_NAME: &str = "kidsapp_users.sqlite3";
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Backing storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private in-memory database, discarded with its connection.
    Memory,
}

/// Settings used to start a user repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: DbLocation,
    /// Maximum number of queued worker jobs before submitters block.
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidQueueCapacity(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQueueCapacity(raw) => write!(
                f,
                "invalid {QUEUE_CAPACITY_ENV} value `{raw}`; expected a positive integer"
            ),
        }
    }
}

impl Error for ConfigError {}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: DbLocation::File(std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl StoreConfig {
    /// File-backed configuration with default queue capacity.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// In-memory configuration with default queue capacity.
    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            ..Self::default()
        }
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Builds configuration from `KIDSAPP_DB_PATH` and
    /// `KIDSAPP_WRITE_QUEUE_CAPACITY`, falling back to defaults.
    ///
    /// Blank values are treated as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(DB_PATH_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.location = DbLocation::File(PathBuf::from(trimmed));
            }
        }

        if let Some(raw) = lookup(QUEUE_CAPACITY_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                config.queue_capacity = match trimmed.parse::<usize>() {
                    Ok(value) if value > 0 => value,
                    _ => return Err(ConfigError::InvalidQueueCapacity(trimmed.to_string())),
                };
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, DbLocation, StoreConfig, DB_PATH_ENV, DEFAULT_QUEUE_CAPACITY,
        QUEUE_CAPACITY_ENV,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }

    #[test]
    fn environment_overrides_path_and_capacity() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_ENV, " /data/users.sqlite3 "),
            (QUEUE_CAPACITY_ENV, "8"),
        ]))
        .unwrap();

        assert_eq!(
            config.location,
            DbLocation::File(PathBuf::from("/data/users.sqlite3"))
        );
        assert_eq!(config.queue_capacity, 8);
    }

    #[test]
    fn blank_path_falls_back_to_default() {
        let config = StoreConfig::from_lookup(lookup_from(&[(DB_PATH_ENV, "   ")])).unwrap();
        assert_eq!(config.location, StoreConfig::default().location);
    }

    #[test]
    fn zero_or_garbage_capacity_is_rejected() {
        for raw in ["0", "-3", "many"] {
            let err = StoreConfig::from_lookup(lookup_from(&[(QUEUE_CAPACITY_ENV, raw)]))
                .unwrap_err();
            assert_eq!(err, ConfigError::InvalidQueueCapacity(raw.to_string()));
        }
    }

    #[test]
    fn with_queue_capacity_clamps_to_one() {
        assert_eq!(StoreConfig::in_memory().with_queue_capacity(0).queue_capacity, 1);
    }
}
