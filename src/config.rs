//! Engine configuration from environment variables.

use crate::error::ConfigError;
use crate::logic::DEFAULT_MAX_PASSES;
use crate::store::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT};
use crate::store::RetryPolicy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Tunables for the service layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    pub retry: RetryPolicy,
    /// Bound on bye-resolution passes. Raise it for very deep brackets.
    pub max_bye_passes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            max_bye_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl EngineConfig {
    /// Read configuration from the environment.
    ///
    /// - `BRACKET_RETRY_ATTEMPTS`: attempts per store call (default: 3)
    /// - `BRACKET_RETRY_BASE_MS`: first retry delay in milliseconds (default: 500)
    /// - `BRACKET_STORE_TIMEOUT_SECS`: timeout per store call (default: 15)
    /// - `BRACKET_MAX_BYE_PASSES`: bye-resolution pass bound (default: 6)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`EngineConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let max_attempts: u32 = read(&lookup, "BRACKET_RETRY_ATTEMPTS", "u32", DEFAULT_MAX_ATTEMPTS)?;
        let base_ms: u64 = read(
            &lookup,
            "BRACKET_RETRY_BASE_MS",
            "u64",
            DEFAULT_BASE_DELAY.as_millis() as u64,
        )?;
        let timeout_secs: u64 = read(
            &lookup,
            "BRACKET_STORE_TIMEOUT_SECS",
            "u64",
            DEFAULT_TIMEOUT.as_secs(),
        )?;
        let max_bye_passes: usize =
            read(&lookup, "BRACKET_MAX_BYE_PASSES", "usize", DEFAULT_MAX_PASSES)?;

        if max_attempts == 0 {
            return Err(ConfigError::TooSmall {
                name: "BRACKET_RETRY_ATTEMPTS",
                min: 1,
            });
        }
        if timeout_secs == 0 {
            return Err(ConfigError::TooSmall {
                name: "BRACKET_STORE_TIMEOUT_SECS",
                min: 1,
            });
        }
        if max_bye_passes == 0 {
            return Err(ConfigError::TooSmall {
                name: "BRACKET_MAX_BYE_PASSES",
                min: 1,
            });
        }

        Ok(Self {
            retry: RetryPolicy {
                max_attempts,
                base_delay: Duration::from_millis(base_ms),
                timeout: Duration::from_secs(timeout_secs),
            },
            max_bye_passes,
        })
    }
}

fn read<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay, Duration::from_millis(500));
        assert_eq!(config.retry.timeout, Duration::from_secs(15));
        assert_eq!(config.max_bye_passes, 6);
    }

    #[test]
    fn reads_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("BRACKET_RETRY_ATTEMPTS", "5"),
            ("BRACKET_RETRY_BASE_MS", "100"),
            ("BRACKET_MAX_BYE_PASSES", "10"),
        ]))
        .unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_millis(100));
        assert_eq!(config.max_bye_passes, 10);
    }

    #[test]
    fn rejects_garbage_and_zero() {
        let err = EngineConfig::from_lookup(lookup(&[("BRACKET_RETRY_ATTEMPTS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BRACKET_RETRY_ATTEMPTS", .. }));

        let err = EngineConfig::from_lookup(lookup(&[("BRACKET_MAX_BYE_PASSES", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooSmall {
                name: "BRACKET_MAX_BYE_PASSES",
                min: 1
            }
        );
    }
}
