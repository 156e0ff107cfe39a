//! Personality configuration.
//!
//! Values come from TOML or from `LOGTRAIL_*` environment variables. Every
//! field has a default except `tree_id`, which must be set to a positive
//! integer before a personality can be built.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ConfigError;

/// Default checkpoint origin line.
pub const DEFAULT_ORIGIN: &str = "Hello World Log";

/// Pacing of the append observation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// First delay between polls, in milliseconds.
    pub initial_ms: u64,
    /// Upper bound on the delay between polls, in milliseconds.
    pub max_ms: u64,
    /// Growth factor applied after each poll.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: 25,
            max_ms: 1_000,
            multiplier: 2.0,
        }
    }
}

/// Configuration for a [`Personality`](crate::Personality).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityConfig {
    /// Log Service endpoint address.
    pub log_addr: String,
    /// Tree served by the log (must be positive).
    pub tree_id: i64,
    /// Timeout for establishing the Log Service connection, in milliseconds.
    pub connect_timeout_ms: u64,
    /// Origin line written into every checkpoint.
    pub origin: String,
    /// Bound on the append observation loop, in milliseconds.
    pub observation_timeout_ms: u64,
    /// Observation loop pacing.
    pub backoff: BackoffConfig,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            log_addr: "localhost:8090".to_string(),
            tree_id: 0,
            connect_timeout_ms: 5_000,
            origin: DEFAULT_ORIGIN.to_string(),
            observation_timeout_ms: 5_000,
            backoff: BackoffConfig::default(),
        }
    }
}

impl PersonalityConfig {
    /// Creates a configuration for `tree_id` with default settings.
    pub fn for_tree(tree_id: i64) -> Self {
        Self {
            tree_id,
            ..Self::default()
        }
    }

    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// `LOGTRAIL_TREE_ID` is required; other variables fall back to defaults.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let tree_id =
            lookup("LOGTRAIL_TREE_ID").ok_or(ConfigError::MissingVar("LOGTRAIL_TREE_ID"))?;
        config.tree_id = parse_var("LOGTRAIL_TREE_ID", tree_id)?;

        if let Some(addr) = lookup("LOGTRAIL_LOG_ADDR") {
            config.log_addr = addr;
        }
        if let Some(origin) = lookup("LOGTRAIL_ORIGIN") {
            config.origin = origin;
        }
        if let Some(v) = lookup("LOGTRAIL_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = parse_var("LOGTRAIL_CONNECT_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("LOGTRAIL_OBSERVATION_TIMEOUT_MS") {
            config.observation_timeout_ms = parse_var("LOGTRAIL_OBSERVATION_TIMEOUT_MS", v)?;
        }

        Ok(config)
    }

    /// Checks every field; called when a personality is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tree_id <= 0 {
            return Err(ConfigError::Invalid {
                field: "tree_id",
                reason: format!("must be provided and positive, got {}", self.tree_id),
            });
        }
        if self.log_addr.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "log_addr",
                reason: "must not be empty".to_string(),
            });
        }
        if self.origin.is_empty() || self.origin.contains('\n') {
            return Err(ConfigError::Invalid {
                field: "origin",
                reason: "must be a single non-empty line".to_string(),
            });
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "connect_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.observation_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "observation_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        let b = &self.backoff;
        if b.initial_ms == 0
            || b.max_ms < b.initial_ms
            || b.multiplier.is_nan()
            || b.multiplier < 1.0
        {
            return Err(ConfigError::Invalid {
                field: "backoff",
                reason: "requires 0 < initial_ms <= max_ms and multiplier >= 1".to_string(),
            });
        }
        Ok(())
    }

    /// Connection timeout as a [`Duration`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Observation loop bound as a [`Duration`].
    pub fn observation_timeout(&self) -> Duration {
        Duration::from_millis(self.observation_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    let parsed = value.trim().parse();
    parsed.map_err(|_| ConfigError::InvalidVar { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_need_a_tree_id() {
        let err = PersonalityConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "tree_id", .. }));
        PersonalityConfig::for_tree(1).validate().unwrap();
    }

    #[test]
    fn negative_tree_id_is_rejected() {
        assert!(PersonalityConfig::for_tree(-4).validate().is_err());
    }

    #[test]
    fn env_overrides_defaults() {
        let config = PersonalityConfig::from_env_with(env(&[
            ("LOGTRAIL_TREE_ID", "42"),
            ("LOGTRAIL_LOG_ADDR", "log.internal:9000"),
            ("LOGTRAIL_CONNECT_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.tree_id, 42);
        assert_eq!(config.log_addr, "log.internal:9000");
        assert_eq!(config.connect_timeout(), Duration::from_millis(250));
        assert_eq!(config.origin, DEFAULT_ORIGIN);
    }

    #[test]
    fn env_requires_tree_id() {
        let err = PersonalityConfig::from_env_with(env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("LOGTRAIL_TREE_ID")));
    }

    #[test]
    fn env_rejects_unparseable_values() {
        let err =
            PersonalityConfig::from_env_with(env(&[("LOGTRAIL_TREE_ID", "seven")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: "LOGTRAIL_TREE_ID", .. }));
    }

    #[test]
    fn toml_fills_missing_fields_with_defaults() {
        let config = PersonalityConfig::from_toml_str(
            r#"
            tree_id = 7
            origin = "example.com/log"

            [backoff]
            max_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.tree_id, 7);
        assert_eq!(config.origin, "example.com/log");
        assert_eq!(config.backoff.max_ms, 500);
        assert_eq!(config.backoff.initial_ms, 25);
        config.validate().unwrap();
    }

    #[test]
    fn multiline_origin_is_rejected() {
        let mut config = PersonalityConfig::for_tree(1);
        config.origin = "two\nlines".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "origin", .. }));
    }

    #[test]
    fn backoff_bounds_are_checked() {
        let mut config = PersonalityConfig::for_tree(1);
        config.backoff.max_ms = 1;
        assert!(config.validate().is_err());
    }
}
