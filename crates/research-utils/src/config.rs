//! Environment-driven configuration helpers
//!
//! Settings structs across the workspace are parsed from a lookup function
//! rather than from `std::env` directly, so tests can feed them a fixed map.
//! [`env_lookup`] is the lookup used in production.

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Lookup function mapping a variable name to its value
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Configuration errors raised while reading settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(String),

    /// A variable is set but its value cannot be used
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Read a variable from the process environment
///
/// Blank values count as unset.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a string setting
pub fn read_string(lookup: EnvLookup<'_>, key: &str) -> Option<String> {
    lookup(key)
}

/// Read a required string setting
pub fn require_string(lookup: EnvLookup<'_>, key: &str) -> Result<String, ConfigError> {
    lookup(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

/// Read and parse a setting, `Ok(None)` when unset
pub fn read_parsed<T>(lookup: EnvLookup<'_>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
                value,
            }),
    }
}

/// Read a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`)
pub fn read_bool(lookup: EnvLookup<'_>, key: &str) -> Result<Option<bool>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid {
                key: key.to_string(),
                value,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}
