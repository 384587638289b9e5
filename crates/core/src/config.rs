//! Environment configuration shared by ProgrammerHelper binaries
//!
//! Every variable is looked up as `PROGRAMMER_HELPER_<NAME>` first, then under
//! its conventional unprefixed name where one exists (`DATABASE_URL`, `PORT`).
//! Call [`load_dotenv`] before loading to pick up a local `.env` file.
//!
//! ```no_run
//! use programmer_helper_core::config::{ConfigLoader, DatabaseConfig, ServiceConfig};
//!
//! # fn example() -> Result<(), programmer_helper_core::HelperError> {
//! programmer_helper_core::config::load_dotenv();
//! let service = ServiceConfig::from_env()?;
//! service.validate()?;
//! let database = DatabaseConfig::from_env()?;
//! database.validate()?;
//! # Ok(())
//! # }
//! ```

use crate::error::HelperError;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const ENV_PREFIX: &str = "PROGRAMMER_HELPER_";

/// Configuration that is read from the environment and checked before use
pub trait ConfigLoader: Sized {
    fn from_env() -> Result<Self, HelperError>;

    fn validate(&self) -> Result<(), HelperError>;
}

fn prefixed(name: &str) -> String {
    format!("{}{}", ENV_PREFIX, name)
}

fn lookup(name: &str, fallback: Option<&str>) -> Option<String> {
    std::env::var(prefixed(name))
        .ok()
        .or_else(|| fallback.and_then(|key| std::env::var(key).ok()))
}

fn invalid(name: &str, message: impl Into<String>) -> HelperError {
    HelperError::ConfigurationError {
        message: message.into(),
        key: Some(prefixed(name)),
    }
}

/// Parse `PROGRAMMER_HELPER_<name>` (or `fallback`), keeping `default` when unset
pub(crate) fn parsed<T>(name: &str, fallback: Option<&str>, default: T) -> Result<T, HelperError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name, fallback) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| invalid(name, format!("cannot parse '{}': {}", raw, e))),
    }
}

/// PostgreSQL pool settings
///
/// `DATABASE_URL` is required; the pool bounds and timeouts (in seconds) are
/// `DATABASE_MAX_CONNECTIONS`, `DATABASE_MIN_CONNECTIONS`,
/// `DATABASE_ACQUIRE_TIMEOUT` and `DATABASE_IDLE_TIMEOUT`.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/programmer_helper".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

impl ConfigLoader for DatabaseConfig {
    fn from_env() -> Result<Self, HelperError> {
        let url = lookup("DATABASE_URL", Some("DATABASE_URL"))
            .ok_or_else(|| invalid("DATABASE_URL", "no database URL is set"))?;
        let defaults = Self::default();

        Ok(Self {
            url,
            max_connections: parsed(
                "DATABASE_MAX_CONNECTIONS",
                None,
                defaults.max_connections,
            )?,
            min_connections: parsed(
                "DATABASE_MIN_CONNECTIONS",
                None,
                defaults.min_connections,
            )?,
            acquire_timeout: Duration::from_secs(parsed(
                "DATABASE_ACQUIRE_TIMEOUT",
                None,
                defaults.acquire_timeout.as_secs(),
            )?),
            idle_timeout: Duration::from_secs(parsed(
                "DATABASE_IDLE_TIMEOUT",
                None,
                defaults.idle_timeout.as_secs(),
            )?),
        })
    }

    fn validate(&self) -> Result<(), HelperError> {
        let url = Url::parse(&self.url)
            .map_err(|e| invalid("DATABASE_URL", format!("not a URL: {}", e)))?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(invalid(
                "DATABASE_URL",
                format!("expected a postgres URL, got scheme '{}'", url.scheme()),
            ));
        }

        if self.max_connections == 0 {
            return Err(invalid(
                "DATABASE_MAX_CONNECTIONS",
                "the pool needs at least one connection",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(invalid(
                "DATABASE_MIN_CONNECTIONS",
                format!(
                    "{} idle connections requested but the pool holds at most {}",
                    self.min_connections, self.max_connections
                ),
            ));
        }
        if self.acquire_timeout.is_zero() {
            return Err(invalid(
                "DATABASE_ACQUIRE_TIMEOUT",
                "acquire timeout must be at least one second",
            ));
        }

        Ok(())
    }
}

/// HTTP listener settings: `SERVICE_HOST` (or `HOST`), `SERVICE_PORT`
/// (or `PORT`) and `SERVICE_WORKERS`
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: num_cpus::get(),
        }
    }
}

impl ServiceConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ConfigLoader for ServiceConfig {
    fn from_env() -> Result<Self, HelperError> {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("SERVICE_HOST", Some("HOST")).unwrap_or(defaults.host),
            port: parsed("SERVICE_PORT", Some("PORT"), defaults.port)?,
            workers: parsed("SERVICE_WORKERS", None, defaults.workers)?,
        })
    }

    fn validate(&self) -> Result<(), HelperError> {
        if self.host.trim().is_empty() {
            return Err(invalid("SERVICE_HOST", "host cannot be blank"));
        }
        if self.port == 0 {
            return Err(invalid("SERVICE_PORT", "port 0 cannot be bound explicitly"));
        }
        if self.workers == 0 {
            return Err(invalid("SERVICE_WORKERS", "at least one worker is required"));
        }
        Ok(())
    }
}

/// Load a `.env` file from the working directory; a missing file is fine
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: ignoring unreadable .env file: {}", e);
        }
    }
}
