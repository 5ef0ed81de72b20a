//! Process configuration, loaded once from the environment at startup.
//!
//! Required variables missing at startup are a fatal [`ConfigError`]; the
//! process root turns that into a non-zero exit code before anything else
//! is constructed.

use crate::error::ConfigError;
use std::env;

/// Upstream feed and backend connection settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `MASSIVE_API_KEY` — upstream feed API key, sent in the `auth` control message.
    pub api_key: String,
    /// `CLICKHOUSE_HOST` — `host:port` of the backend.
    pub clickhouse_host: String,
    /// `CLICKHOUSE_USER`
    pub clickhouse_user: String,
    /// `CLICKHOUSE_PASSWORD`, optional.
    pub clickhouse_password: Option<String>,
    /// `CLICKHOUSE_DB`, optional; used as the unqualified-table prefix in INSERT statements.
    pub clickhouse_db: String,
    /// `CLICKHOUSE_SECURE=true` wraps the backend connection in TLS.
    pub clickhouse_secure: bool,
    /// `INGEST_LOG_LEVEL`, default `info`. Pure observability knob.
    pub log_level: String,
    /// `INGEST_LOG_JSON=true` switches the log formatter to JSON. Pure observability knob.
    pub log_json: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = require_env("MASSIVE_API_KEY")?;
        let clickhouse_host = require_env("CLICKHOUSE_HOST")?;
        validate_host_port("CLICKHOUSE_HOST", &clickhouse_host)?;
        let clickhouse_user = require_env("CLICKHOUSE_USER")?;

        Ok(Self {
            api_key,
            clickhouse_host,
            clickhouse_user,
            clickhouse_password: optional_env("CLICKHOUSE_PASSWORD"),
            clickhouse_db: optional_env("CLICKHOUSE_DB").unwrap_or_default(),
            clickhouse_secure: optional_env("CLICKHOUSE_SECURE").as_deref() == Some("true"),
            log_level: optional_env("INGEST_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: optional_env("INGEST_LOG_JSON").as_deref() == Some("true"),
        })
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingEnv(name))
}

fn optional_env(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Enforces the `host:port` shape documented for `CLICKHOUSE_HOST`: a
/// non-empty host and a numeric port. Malformed values are fatal at
/// startup rather than surfacing as an opaque DSN-parse failure once the
/// backend connection is attempted.
fn validate_host_port(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    };
    let (host, port) = value.split_once(':').ok_or_else(invalid)?;
    if host.is_empty() {
        return Err(invalid());
    }
    port.parse::<u16>().map_err(|_| invalid())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear() {
        for k in [
            "MASSIVE_API_KEY",
            "CLICKHOUSE_HOST",
            "CLICKHOUSE_USER",
            "CLICKHOUSE_PASSWORD",
            "CLICKHOUSE_DB",
            "CLICKHOUSE_SECURE",
            "INGEST_LOG_LEVEL",
            "INGEST_LOG_JSON",
        ] {
            unsafe { env::remove_var(k) };
        }
    }

    #[test]
    fn missing_required_var_is_fatal() {
        clear();
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("MASSIVE_API_KEY")));
    }

    #[test]
    fn defaults_apply_when_optional_vars_absent() {
        clear();
        unsafe {
            env::set_var("MASSIVE_API_KEY", "key");
            env::set_var("CLICKHOUSE_HOST", "ch.internal:9440");
            env::set_var("CLICKHOUSE_USER", "default");
        }
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.clickhouse_password, None);
        assert_eq!(cfg.clickhouse_db, "");
        assert!(!cfg.clickhouse_secure);
        assert_eq!(cfg.log_level, "info");
        clear();
    }

    #[test]
    fn malformed_clickhouse_host_is_fatal() {
        clear();
        unsafe {
            env::set_var("MASSIVE_API_KEY", "key");
            env::set_var("CLICKHOUSE_HOST", "ch.internal-no-port");
            env::set_var("CLICKHOUSE_USER", "default");
        }
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "CLICKHOUSE_HOST", .. }));
        clear();
    }

    #[test]
    fn clickhouse_host_with_non_numeric_port_is_fatal() {
        clear();
        unsafe {
            env::set_var("MASSIVE_API_KEY", "key");
            env::set_var("CLICKHOUSE_HOST", "ch.internal:not-a-port");
            env::set_var("CLICKHOUSE_USER", "default");
        }
        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "CLICKHOUSE_HOST", .. }));
        clear();
    }

    #[test]
    fn secure_flag_requires_exact_string() {
        clear();
        unsafe {
            env::set_var("MASSIVE_API_KEY", "key");
            env::set_var("CLICKHOUSE_HOST", "ch:9440");
            env::set_var("CLICKHOUSE_USER", "default");
            env::set_var("CLICKHOUSE_SECURE", "yes");
        }
        let cfg = AppConfig::from_env().unwrap();
        assert!(!cfg.clickhouse_secure, "only the literal \"true\" enables TLS");
        clear();
    }
}
