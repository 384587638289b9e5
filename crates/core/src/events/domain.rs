//! Domain events and the handler registry
//!
//! Handlers are registered explicitly on an [`EventBus`] at startup and run in
//! registration order when an event is published. A failing handler is logged
//! and does not stop the remaining handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::{ItemId, UserId};

/// Event handler errors
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Invalid event data: {0}")]
    InvalidEvent(String),
}

pub type EventResult<T> = Result<T, EventError>;

/// Something that happened in the domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    AccountCreated {
        user: UserId,
        username: String,
        at: DateTime<Utc>,
    },
    JudgementRecorded {
        item: ItemId,
        user: UserId,
        at: DateTime<Utc>,
    },
}

impl DomainEvent {
    pub fn account_created(user: UserId, username: impl Into<String>) -> Self {
        DomainEvent::AccountCreated {
            user,
            username: username.into(),
            at: Utc::now(),
        }
    }

    pub fn judgement_recorded(item: ItemId, user: UserId) -> Self {
        DomainEvent::JudgementRecorded {
            item,
            user,
            at: Utc::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::AccountCreated { .. } => "account_created",
            DomainEvent::JudgementRecorded { .. } => "judgement_recorded",
        }
    }
}

/// Reacts to domain events
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    async fn handle(&self, event: &DomainEvent) -> EventResult<()>;
}

/// Registry of event handlers
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; it receives every event published afterwards
    pub async fn register(&self, handler: Arc<dyn EventHandler>) {
        debug!(handler = handler.name(), "Registering event handler");
        self.handlers.write().await.push(handler);
    }

    pub async fn handler_count(&self) -> usize {
        self.handlers.read().await.len()
    }

    /// Deliver an event to every handler. Returns the number of handlers
    /// that failed.
    pub async fn publish(&self, event: DomainEvent) -> usize {
        let handlers = self.handlers.read().await.clone();
        let mut failures = 0;

        for handler in handlers {
            if let Err(e) = handler.handle(&event).await {
                warn!(
                    handler = handler.name(),
                    event = event.name(),
                    error = %e,
                    "Event handler failed"
                );
                failures += 1;
            }
        }

        debug!(event = event.name(), failures, "Published domain event");
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(AtomicUsize);

    #[async_trait::async_trait]
    impl EventHandler for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn handle(&self, _event: &DomainEvent) -> EventResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl EventHandler for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn handle(&self, _event: &DomainEvent) -> EventResult<()> {
            Err(EventError::InvalidEvent("nope".into()))
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_every_handler() {
        let bus = EventBus::new();
        let counter = Arc::new(Counting(AtomicUsize::new(0)));
        bus.register(counter.clone()).await;
        bus.register(Arc::new(Failing)).await;
        bus.register(counter.clone()).await;

        let failures = bus
            .publish(DomainEvent::judgement_recorded(ItemId(1), UserId(2)))
            .await;

        assert_eq!(failures, 1);
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
        assert_eq!(bus.handler_count().await, 3);
    }

    #[tokio::test]
    async fn test_publish_without_handlers() {
        let bus = EventBus::new();
        let failures = bus
            .publish(DomainEvent::account_created(UserId(1), "ferris"))
            .await;
        assert_eq!(failures, 0);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = DomainEvent::account_created(UserId(5), "ferris");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "account_created");
        assert_eq!(json["user"], 5);
    }
}
