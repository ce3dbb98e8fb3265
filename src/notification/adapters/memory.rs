//! In-memory notification store for tests and demos.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::notification::{
    domain::{NewNotification, Notification, NotificationId},
    ports::{
        NotificationFeedSource, NotificationRepository, NotificationStoreError,
        NotificationStoreResult, PUSH_CHANNEL_CAPACITY,
    },
};

/// Thread-safe in-memory notification store.
///
/// Every insert is also pushed to open subscriptions.
#[derive(Debug, Clone)]
pub struct InMemoryNotificationStore {
    state: Arc<RwLock<NotificationState>>,
    pushes: broadcast::Sender<Notification>,
}

#[derive(Debug, Default)]
struct NotificationState {
    rows: Vec<Notification>,
    serial: i64,
}

impl InMemoryNotificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for InMemoryNotificationStore {
    fn default() -> Self {
        let (pushes, _) = broadcast::channel(PUSH_CHANNEL_CAPACITY);
        Self {
            state: Arc::default(),
            pushes,
        }
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationStore {
    async fn insert(&self, notification: &NewNotification) -> NotificationStoreResult<Notification> {
        let mut state = self.state.write().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.serial = state.serial.saturating_add(1);
        let stored = Notification {
            id: NotificationId::new(state.serial),
            kind: notification.kind,
            title: notification.title.clone(),
            message: notification.message.clone(),
            job_id: notification.job_id,
            created_at: notification.created_at,
        };
        state.rows.push(stored.clone());
        // No open subscription is not an error.
        let _receivers = self.pushes.send(stored.clone()).unwrap_or(0);
        Ok(stored)
    }

    async fn list_recent(&self, limit: usize) -> NotificationStoreResult<Vec<Notification>> {
        let state = self.state.read().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut rows = state.rows.clone();
        rows.sort_by(|left, right| {
            (right.created_at, right.id).cmp(&(left.created_at, left.id))
        });
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list_after(&self, after: NotificationId) -> NotificationStoreResult<Vec<Notification>> {
        let state = self.state.read().map_err(|err| {
            NotificationStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state
            .rows
            .iter()
            .filter(|row| row.id > after)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationFeedSource for InMemoryNotificationStore {
    async fn subscribe(&self) -> NotificationStoreResult<broadcast::Receiver<Notification>> {
        Ok(self.pushes.subscribe())
    }
}
