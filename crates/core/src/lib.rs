//! # ProgrammerHelper Core
//!
//! Shared building blocks for the ProgrammerHelper services.
//!
//! ## Modules
//!
//! - `models`: content items, opinions, scopes and tags
//! - `error`: the shared error type
//! - `validation`: write-time validation rules
//! - `config`: environment-driven configuration loading
//! - `database`: PostgreSQL connection pool
//! - `observability`: structured logging setup
//! - `events`: explicit domain event handlers

pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod models;
pub mod observability;
pub mod validation;

pub use config::{load_dotenv, ConfigLoader, DatabaseConfig, ServiceConfig};
pub use database::{is_foreign_key_violation, is_unique_violation, DatabasePool};
pub use error::HelperError;
pub use events::{
    DomainEvent, EventBus, EventError, EventHandler, Inbox, InboxMessage, WelcomeMessageHandler,
};
pub use models::{
    ContentItem, ContentKind, ItemId, JudgementKind, NewItem, NewOpinion, NewScope, NewTag,
    Opinion, Scope, Tag, TagId, UserId,
};
pub use observability::{init_logging, LogConfig, LogFormat, ObservabilityError};

/// Result type alias for ProgrammerHelper operations
pub type Result<T> = std::result::Result<T, HelperError>;
