//! Process configuration read from the environment.
//!
//! # Invariants
//! - Blank values are treated the same as unset variables.
//! - Lookup never fails; absent values fall back to documented defaults.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "YUMYUM_DATA_DIR";
pub const SEED_DIR_ENV: &str = "YUMYUM_SEED_DIR";
pub const LOG_LEVEL_ENV: &str = "YUMYUM_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "YUMYUM_LOG_DIR";

/// Startup configuration for the store host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Persistent, writable data directory. `None` selects a seeded scratch directory.
    pub data_dir: Option<PathBuf>,
    /// Directory to seed a scratch data directory from instead of the embedded set.
    pub seed_dir: Option<PathBuf>,
    pub log_level: String,
    /// Rolling log directory. `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed_dir: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads `YUMYUM_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        Self {
            data_dir: value(DATA_DIR_ENV).map(PathBuf::from),
            seed_dir: value(SEED_DIR_ENV).map(PathBuf::from),
            log_level: value(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}
