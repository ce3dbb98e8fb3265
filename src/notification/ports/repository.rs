//! Repository port for the `notifications` table.

use crate::notification::domain::{NewNotification, Notification, NotificationId};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for notification store operations.
pub type NotificationStoreResult<T> = Result<T, NotificationStoreError>;

/// Notification persistence contract.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Inserts a notification and returns it with its assigned key.
    async fn insert(&self, notification: &NewNotification) -> NotificationStoreResult<Notification>;

    /// Returns up to `limit` notifications, newest first.
    async fn list_recent(&self, limit: usize) -> NotificationStoreResult<Vec<Notification>>;

    /// Returns notifications with an id greater than `after`, oldest first.
    async fn list_after(&self, after: NotificationId) -> NotificationStoreResult<Vec<Notification>>;
}

/// Errors returned by notification store implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationStoreError {
    /// The store did not answer in time.
    #[error("notification store timed out after {0:?}")]
    Timeout(Duration),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns whether repeating the request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<crate::remote::RemoteTimeout> for NotificationStoreError {
    fn from(timeout: crate::remote::RemoteTimeout) -> Self {
        Self::Timeout(timeout.after())
    }
}
