//! Runtime configuration loaded from environment variables.
//!
//! | Variable                     | Default            |
//! |------------------------------|--------------------|
//! | `ROLLCALL_DB_PATH`           | `rollcall.sqlite3` |
//! | `ROLLCALL_LOG_LEVEL`         | build default      |
//! | `ROLLCALL_LOG_DIR`           | unset, no file log |
//! | `ROLLCALL_SCAN_DELAY_MS`     | `2500`             |
//! | `ROLLCALL_SCAN_SUCCESS_RATE` | `0.8`              |

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "ROLLCALL_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ROLLCALL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ROLLCALL_LOG_DIR";
pub const ENV_SCAN_DELAY_MS: &str = "ROLLCALL_SCAN_DELAY_MS";
pub const ENV_SCAN_SUCCESS_RATE: &str = "ROLLCALL_SCAN_SUCCESS_RATE";

const DEFAULT_DB_FILE_NAME: &str = "rollcall.sqlite3";
const DEFAULT_SCAN_DELAY_MS: u64 = 2500;
const DEFAULT_SCAN_SUCCESS_RATE: f64 = 0.8;

/// Simulated scan timing and odds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSettings {
    pub delay: Duration,
    /// Probability in `0.0..=1.0` that a capture matches someone.
    pub success_rate: f64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_SCAN_DELAY_MS),
            success_rate: DEFAULT_SCAN_SUCCESS_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub scan: ScanSettings,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            scan: ScanSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key}=`{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let db_path = read(ENV_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);
        let log_level = read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level);
        let log_dir = read(ENV_LOG_DIR).map(PathBuf::from);

        let delay = match read(ENV_SCAN_DELAY_MS) {
            Some(value) => Duration::from_millis(value.parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: ENV_SCAN_DELAY_MS,
                    value: value.clone(),
                    reason: "expected a whole number of milliseconds",
                }
            })?),
            None => defaults.scan.delay,
        };

        let success_rate = match read(ENV_SCAN_SUCCESS_RATE) {
            Some(value) => parse_rate(&value)?,
            None => defaults.scan.success_rate,
        };

        Ok(Self {
            db_path,
            log_level,
            log_dir,
            scan: ScanSettings {
                delay,
                success_rate,
            },
        })
    }
}

fn parse_rate(value: &str) -> Result<f64, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: ENV_SCAN_SUCCESS_RATE,
        value: value.to_string(),
        reason: "expected a probability between 0.0 and 1.0",
    };
    let rate = value.parse::<f64>().map_err(|_| invalid())?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(invalid());
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_SCAN_DELAY_MS,
        ENV_SCAN_SUCCESS_RATE,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> Result<CoreConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.scan.delay, Duration::from_millis(2500));
        assert_eq!(config.scan.success_rate, 0.8);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn reads_overrides_and_ignores_blank_values() {
        let config = config_from(&[
            (ENV_DB_PATH, "/var/lib/rollcall/main.sqlite3"),
            (ENV_LOG_DIR, "   "),
            (ENV_SCAN_DELAY_MS, "0"),
            (ENV_SCAN_SUCCESS_RATE, "1"),
        ])
        .unwrap();
        assert_eq!(
            config.db_path,
            PathBuf::from("/var/lib/rollcall/main.sqlite3")
        );
        assert_eq!(config.log_dir, None);
        assert_eq!(config.scan.delay, Duration::ZERO);
        assert_eq!(config.scan.success_rate, 1.0);
    }

    #[test]
    fn rejects_out_of_range_rate() {
        let err = config_from(&[(ENV_SCAN_SUCCESS_RATE, "1.5")]).unwrap_err();
        assert!(err.to_string().contains(ENV_SCAN_SUCCESS_RATE));

        assert!(config_from(&[(ENV_SCAN_SUCCESS_RATE, "NaN")]).is_err());
    }

    #[test]
    fn rejects_non_numeric_delay() {
        let err = config_from(&[(ENV_SCAN_DELAY_MS, "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_SCAN_DELAY_MS,
                ..
            }
        ));
    }
}
