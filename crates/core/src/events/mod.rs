//! Explicit domain event handling
//!
//! Side effects such as greeting a new account are wired by registering
//! handlers on an [`EventBus`] rather than through implicit hooks.

pub mod domain;
pub mod inbox;

pub use domain::{DomainEvent, EventBus, EventError, EventHandler, EventResult};
pub use inbox::{Inbox, InboxMessage, WelcomeMessageHandler};
