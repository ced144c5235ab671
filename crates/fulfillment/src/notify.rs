//! Notification dispatcher trait and in-memory implementation.
//!
//! Transport (email/push) lives outside the core; the coordinator only
//! emits notifications at each transition. Dispatch failures are logged
//! and swallowed by the caller, never surfaced as operation failures.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{TransactionRef, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationTopic {
    /// An order changed status.
    OrderUpdate,

    /// A donation claim changed status.
    ClaimUpdate,

    /// A delivery changed status.
    DeliveryUpdate,
}

impl NotificationTopic {
    /// Returns the wire name of the topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationTopic::OrderUpdate => "ORDER_UPDATE",
            NotificationTopic::ClaimUpdate => "CLAIM_UPDATE",
            NotificationTopic::DeliveryUpdate => "DELIVERY_UPDATE",
        }
    }
}

impl std::fmt::Display for NotificationTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification emitted by the coordinator at a transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// The user being notified.
    pub recipient: UserId,

    /// What the notification is about.
    pub topic: NotificationTopic,

    /// Human-readable message.
    pub message: String,

    /// The transaction the notification concerns, if any.
    pub transaction: Option<TransactionRef>,

    /// Read marker, flipped by the consuming surface.
    pub is_read: bool,

    /// When the notification was emitted.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a new, unread notification.
    pub fn new(
        recipient: UserId,
        topic: NotificationTopic,
        message: impl Into<String>,
        transaction: Option<TransactionRef>,
    ) -> Self {
        Self {
            recipient,
            topic,
            message: message.into(),
            transaction,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

/// Error from a notification transport.
#[derive(Debug, Error)]
#[error("Notification dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Trait for notification transports.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Delivers a notification to its recipient.
    async fn dispatch(&self, notification: Notification) -> Result<(), DispatchError>;
}

#[derive(Debug, Default)]
struct InMemoryDispatcherState {
    sent: Vec<Notification>,
    fail_on_dispatch: bool,
}

/// In-memory notification dispatcher for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationDispatcher {
    state: Arc<RwLock<InMemoryDispatcherState>>,
}

impl InMemoryNotificationDispatcher {
    /// Creates a new in-memory dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the dispatcher to fail on subsequent dispatch calls.
    pub fn set_fail_on_dispatch(&self, fail: bool) {
        self.state.write().unwrap().fail_on_dispatch = fail;
    }

    /// Returns the number of notifications sent.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }

    /// Returns all notifications sent to a recipient.
    pub fn sent_to(&self, recipient: UserId) -> Vec<Notification> {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .filter(|n| n.recipient == recipient)
            .cloned()
            .collect()
    }

    /// Returns the topics of all sent notifications, in order.
    pub fn topics(&self) -> Vec<NotificationTopic> {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .map(|n| n.topic)
            .collect()
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryNotificationDispatcher {
    async fn dispatch(&self, notification: Notification) -> Result<(), DispatchError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_dispatch {
            return Err(DispatchError("Transport unavailable".to_string()));
        }

        state.sent.push(notification);
        Ok(())
    }
}
