//! Per-user inbox and the welcome message sent to new accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::domain::{DomainEvent, EventError, EventHandler, EventResult};
use crate::models::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub recipient: UserId,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory inbox keyed by recipient
#[derive(Clone, Default)]
pub struct Inbox {
    messages: Arc<RwLock<HashMap<UserId, Vec<InboxMessage>>>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn deliver(&self, message: InboxMessage) {
        self.messages
            .write()
            .await
            .entry(message.recipient)
            .or_default()
            .push(message);
    }

    pub async fn messages_for(&self, user: UserId) -> Vec<InboxMessage> {
        self.messages
            .read()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }
}

/// Greets every new account with an inbox message
pub struct WelcomeMessageHandler {
    inbox: Inbox,
}

impl WelcomeMessageHandler {
    pub fn new(inbox: Inbox) -> Self {
        Self { inbox }
    }
}

#[async_trait::async_trait]
impl EventHandler for WelcomeMessageHandler {
    fn name(&self) -> &str {
        "welcome_message"
    }

    async fn handle(&self, event: &DomainEvent) -> EventResult<()> {
        let DomainEvent::AccountCreated { user, username, at } = event else {
            return Ok(());
        };

        if username.trim().is_empty() {
            return Err(EventError::InvalidEvent(format!(
                "account {} has an empty username",
                user
            )));
        }

        self.inbox
            .deliver(InboxMessage {
                recipient: *user,
                subject: "Welcome to ProgrammerHelper".to_string(),
                body: format!(
                    "Hello, {}! Your account is ready. Share snippets, answer questions and rate what helped you.",
                    username
                ),
                created_at: *at,
            })
            .await;

        info!(user = %user, "Delivered welcome message");
        Ok(())
    }
}
