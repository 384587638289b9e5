//! Error types for ProgrammerHelper services
//!
//! A single error enum is shared by the core models, the content stores and
//! the scoring service so that HTTP handlers can map any failure to a status
//! code without knowing which layer produced it.

use thiserror::Error;

/// Unified error type for ProgrammerHelper operations
#[derive(Debug, Error)]
pub enum HelperError {
    /// Input failed validation
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String, key: Option<String> },

    /// An operation was called without the arguments it needs
    #[error("{0}")]
    Usage(String),

    /// A range filter received a lower bound above its upper bound
    #[error("Invalid range: min ({min}) must not exceed max ({max})")]
    InvalidRange { min: String, max: String },

    /// A user tried to judge content they authored
    #[error("User {user} cannot judge their own item {item}")]
    SelfJudgement { user: i64, item: i64 },

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Requested entity does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Database driver failure
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HelperError {
    /// Validation error tied to a specific field
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Validation error without a field
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: None,
        }
    }

    /// Range error carrying the offending bounds
    pub fn invalid_range(min: impl ToString, max: impl ToString) -> Self {
        Self::InvalidRange {
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Not-found error for an entity kind and id
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } | Self::SelfJudgement { .. } => 422,
            Self::Usage(_) | Self::InvalidRange { .. } => 400,
            Self::Conflict { .. } => 409,
            Self::NotFound { .. } => 404,
            Self::ConfigurationError { .. } | Self::DatabaseError(_) | Self::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in JSON error bodies
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationError { .. } => "validation_error",
            Self::ConfigurationError { .. } => "configuration_error",
            Self::Usage(_) => "usage_error",
            Self::InvalidRange { .. } => "invalid_range",
            Self::SelfJudgement { .. } => "self_judgement",
            Self::Conflict { .. } => "conflict",
            Self::NotFound { .. } => "not_found",
            Self::DatabaseError(_) => "database_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<validator::ValidationErrors> for HelperError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors.field_errors().keys().next().map(|k| k.to_string());
        Self::ValidationError {
            message: errors.to_string(),
            field,
        }
    }
}
