//! Structured logging initialisation
//!
//! Services call [`init_logging`] once at startup. Output is JSON in
//! production and human-readable otherwise; the filter comes from `RUST_LOG`
//! when set, else from the configured level.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("Failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// `json` selects JSON output, anything else pretty output
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub service_name: String,
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "programmer-helper".to_string(),
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Build from `SERVICE_NAME`, `LOG_LEVEL` and `LOG_FORMAT`.
    /// `RUST_ENV=production` defaults the format to JSON.
    pub fn from_env(default_service: &str) -> Self {
        let service_name =
            std::env::var("SERVICE_NAME").unwrap_or_else(|_| default_service.to_string());
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let is_production = std::env::var("RUST_ENV")
            .map(|e| e == "production")
            .unwrap_or(false);
        let format = match std::env::var("LOG_FORMAT") {
            Ok(value) => LogFormat::parse(&value),
            Err(_) if is_production => LogFormat::Json,
            Err(_) => LogFormat::Pretty,
        };

        Self {
            service_name,
            level,
            format,
        }
    }

    fn env_filter(&self) -> Result<EnvFilter, ObservabilityError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.level)
                .map_err(|_| ObservabilityError::InvalidFilter(self.level.clone())),
        }
    }
}

/// Install the global tracing subscriber
pub fn init_logging(config: &LogConfig) -> Result<(), ObservabilityError> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
    };
    result.map_err(|e| ObservabilityError::SubscriberInit(e.to_string()))?;

    tracing::info!(service = %config.service_name, "Logging initialized");
    Ok(())
}
