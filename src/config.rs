use std::net::SocketAddr;

use thiserror::Error;

use crate::infrastructure::argon2_password_hasher::Argon2Cost;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL (or PRISMA_DATABASE_URL) is not set")]
    MissingDatabaseUrl,

    #[error("{key} has an invalid value {value:?}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub sql_logging: bool,
    pub bind_address: SocketAddr,
    pub debug_errors: bool,
    pub argon2: Argon2Cost,
    pub log_format: LogFormat,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = non_empty("DATABASE_URL")
            .or_else(|| non_empty("PRISMA_DATABASE_URL"))
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let defaults = Argon2Cost::default();

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", 1)?,
            sql_logging: flag_or(&lookup, "DATABASE_SQL_LOGGING", false)?,
            bind_address: parse_or(
                &lookup,
                "BIND_ADDRESS",
                SocketAddr::from(([0, 0, 0, 0], 8080)),
            )?,
            debug_errors: flag_or(&lookup, "SIGNUP_DEBUG_ERRORS", false)?,
            argon2: Argon2Cost {
                memory_kib: parse_or(&lookup, "ARGON2_MEMORY_KIB", defaults.memory_kib)?,
                iterations: parse_or(&lookup, "ARGON2_ITERATIONS", defaults.iterations)?,
                parallelism: parse_or(&lookup, "ARGON2_PARALLELISM", defaults.parallelism)?,
            },
            log_format: log_format(&lookup)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    key,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(default),
    }
}

fn flag_or<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn log_format<F>(lookup: &F) -> Result<LogFormat, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("LOG_FORMAT").map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(LogFormat::Pretty),
        Some(v) if v.is_empty() || v == "pretty" => Ok(LogFormat::Pretty),
        Some(v) if v == "json" => Ok(LogFormat::Json),
        Some(v) => Err(ConfigError::InvalidValue {
            key: "LOG_FORMAT",
            value: v,
            reason: "expected `pretty` or `json`".to_string(),
        }),
    }
}
