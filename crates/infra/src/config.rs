//! Configuration loading and representation.
//!
//! Every field has a default, so an empty environment (or `{}`) is a valid
//! configuration. Values are read from `SSOBRIDGE_*` variables or from a JSON
//! document and validated before use.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_SESSION_TTL_SECS: &str = "SSOBRIDGE_SESSION_TTL_SECS";
pub const ENV_SESSION_RECHECK_SECS: &str = "SSOBRIDGE_SESSION_RECHECK_SECS";
pub const ENV_LOG: &str = "SSOBRIDGE_LOG";

/// Upper bound on session lifetime (30 days).
pub const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be an unsigned integer, got '{value}'")]
    Parse { var: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("malformed configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsoConfig {
    /// Lifetime of a local session.
    pub session_ttl_secs: u64,
    /// How often a session should be re-validated against the identity provider.
    pub session_recheck_secs: u64,
    /// `tracing` filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for SsoConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 3600,
            session_recheck_secs: 180,
            log_filter: "info".to_string(),
        }
    }
}

impl SsoConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_SESSION_TTL_SECS) {
            config.session_ttl_secs = parse_secs(ENV_SESSION_TTL_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_SESSION_RECHECK_SECS) {
            config.session_recheck_secs = parse_secs(ENV_SESSION_RECHECK_SECS, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG) {
            config.log_filter = value;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::Invalid("session_ttl_secs must be positive".to_string()));
        }
        if self.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "session_ttl_secs must not exceed {MAX_SESSION_TTL_SECS}"
            )));
        }
        if self.session_recheck_secs > self.session_ttl_secs {
            return Err(ConfigError::Invalid(
                "session_recheck_secs must not exceed session_ttl_secs".to_string(),
            ));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl_secs.min(MAX_SESSION_TTL_SECS) as i64)
    }

    pub fn session_recheck(&self) -> Duration {
        Duration::seconds(self.session_recheck_secs.min(MAX_SESSION_TTL_SECS) as i64)
    }
}

fn parse_secs(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Parse {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = SsoConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SsoConfig::default());
        assert_eq!(config.session_ttl(), Duration::hours(1));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = SsoConfig::from_lookup(lookup(&[
            (ENV_SESSION_TTL_SECS, "900"),
            (ENV_SESSION_RECHECK_SECS, " 60 "),
            (ENV_LOG, "debug"),
        ]))
        .unwrap();

        assert_eq!(config.session_ttl_secs, 900);
        assert_eq!(config.session_recheck_secs, 60);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn non_numeric_ttl_is_rejected() {
        let err = SsoConfig::from_lookup(lookup(&[(ENV_SESSION_TTL_SECS, "1h")])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { var: ENV_SESSION_TTL_SECS, .. }));
    }

    #[test]
    fn recheck_longer_than_ttl_is_rejected() {
        let err = SsoConfig::from_lookup(lookup(&[
            (ENV_SESSION_TTL_SECS, "60"),
            (ENV_SESSION_RECHECK_SECS, "120"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn json_document_fills_missing_fields() {
        let config = SsoConfig::from_json(r#"{ "session_ttl_secs": 7200 }"#).unwrap();
        assert_eq!(config.session_ttl_secs, 7200);
        assert_eq!(config.session_recheck_secs, 180);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = SsoConfig::from_json(r#"{ "session_ttl_secs": 0 }"#).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = SsoConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
