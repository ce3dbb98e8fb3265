//! Push port for notifications inserted after a subscription opens.
//!
//! A subscription is a broadcast receiver: a slow reader is told how many
//! notifications it skipped rather than blocking the sender, and is expected
//! to catch up with a poll.

use super::NotificationStoreResult;
use crate::notification::domain::Notification;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Capacity of a push channel before slow receivers start to lag.
pub const PUSH_CHANNEL_CAPACITY: usize = 64;

/// Source of live notification inserts.
#[async_trait]
pub trait NotificationFeedSource: Send + Sync {
    /// Opens a subscription to notifications stored from now on.
    async fn subscribe(&self) -> NotificationStoreResult<broadcast::Receiver<Notification>>;
}
