//! Environment-driven configuration for the Drona binaries.
//!
//! Both the API server and the workers construct a [`Settings`] once at
//! startup and pass handles down; nothing reads the environment after init.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Which worker loop a worker process runs. Selected by `WORKER_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerType {
    Submission,
    Grading,
}

/// Application settings, loaded once from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Postgres connection URL (`DATABASE_URL`).
    pub database_url: String,
    /// Redis connection URL (`REDIS_URL`).
    pub redis_url: String,
    /// HMAC key for signing access and refresh tokens (`JWT_SECRET_KEY`).
    pub jwt_secret: String,
    /// Address the API server binds (`BIND_ADDR`).
    pub bind_addr: String,

    /// Access token lifetime.
    pub access_token_ttl: Duration,
    /// Refresh token lifetime; also the TTL of the KV active-session mirror.
    pub refresh_token_ttl: Duration,
    /// One-time-password lifetime (`OTP_TTL_SECS`). The OTP delivery surface
    /// is a separate service; the TTL is configured alongside the rest of the
    /// auth knobs.
    pub otp_ttl: Duration,

    /// Submission worker: pause between empty polls.
    pub poll_interval: Duration,
    /// Submission worker: BRPOP timeout.
    pub blocking_timeout: Duration,
    /// Grading worker: pause between queue sweeps.
    pub check_interval: Duration,
    /// Grading worker: how long every queue must stay empty before grading.
    pub empty_threshold: Duration,

    /// Max connections in the Postgres pool.
    pub db_pool_size: u32,
}

impl Settings {
    /// Load settings from the process environment, after sourcing `.env`
    /// when present.
    pub fn from_env() -> Result<Settings, ConfigError> {
        // A missing .env file is fine; explicit environment always wins.
        let _ = dotenvy::dotenv();

        Ok(Settings {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            jwt_secret: required("JWT_SECRET_KEY")?,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            access_token_ttl: duration_secs("ACCESS_TOKEN_TTL_SECS", 90 * 24 * 3600)?,
            refresh_token_ttl: duration_secs("REFRESH_TOKEN_TTL_SECS", 365 * 24 * 3600)?,
            otp_ttl: duration_secs("OTP_TTL_SECS", 300)?,
            poll_interval: duration_secs("WORKER_POLL_INTERVAL_SECS", 1)?,
            blocking_timeout: duration_secs("WORKER_BLOCKING_TIMEOUT_SECS", 5)?,
            check_interval: duration_secs("GRADING_CHECK_INTERVAL_SECS", 30)?,
            empty_threshold: duration_secs("GRADING_EMPTY_THRESHOLD_SECS", 60)?,
            db_pool_size: parsed("DB_POOL_SIZE", 16)?,
        })
    }

    /// Worker type for a worker process (`WORKER_TYPE`, default submission).
    pub fn worker_type() -> Result<WorkerType, ConfigError> {
        match optional("WORKER_TYPE").as_deref() {
            None => Ok(WorkerType::Submission),
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "submission" => Ok(WorkerType::Submission),
                "grading" => Ok(WorkerType::Grading),
                other => Err(ConfigError::Invalid {
                    name: "WORKER_TYPE",
                    value: other.to_string(),
                    reason: "expected \"submission\" or \"grading\"".to_string(),
                }),
            },
        }
    }
}

/// Install the global tracing subscriber for a binary. `RUST_LOG` overrides
/// the default level.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn optional(name: &'static str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
            name,
            value: raw,
            reason: err.to_string(),
        }),
    }
}

fn duration_secs(name: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    Ok(Duration::from_secs(parsed(name, default_secs)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_falls_back_to_default() {
        // Env var names chosen to never collide with real configuration.
        assert_eq!(parsed::<u32>("DRONA_TEST_UNSET_VALUE", 7).unwrap(), 7);
    }

    #[test]
    fn invalid_numeric_value_is_reported_with_context() {
        env::set_var("DRONA_TEST_BAD_NUMBER", "not-a-number");
        let err = parsed::<u32>("DRONA_TEST_BAD_NUMBER", 1).unwrap_err();
        match err {
            ConfigError::Invalid { name, value, .. } => {
                assert_eq!(name, "DRONA_TEST_BAD_NUMBER");
                assert_eq!(value, "not-a-number");
            }
            other => panic!("expected invalid-value error, got {other:?}"),
        }
        env::remove_var("DRONA_TEST_BAD_NUMBER");
    }
}
