//! Notification tracker: merges the server list with device-local overlays.
//!
//! The tracker is the single owner of the [`NotificationFeed`]. Initial
//! loads, polls and pushes all funnel through [`NotificationTracker::ingest`],
//! so a notification delivered twice is listed once. Read and hidden ids are
//! written to local state on every change and never sent to the server.

use crate::local_state::{LocalKey, LocalStateError, LocalStateStore, load_json, save_json};
use crate::notification::{
    domain::{
        FeedItem, IngestOutcome, NewNotification, Notification, NotificationDomainError,
        NotificationFeed, NotificationId, NotificationKind,
    },
    ports::{AlertPermission, DesktopAlerter, NotificationRepository, NotificationStoreError},
};
use crate::remote::{DEFAULT_REMOTE_TIMEOUT, bounded};
use crate::shop::domain::JobId;
use mockable::Clock;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Number of notifications fetched by a full load.
pub const INITIAL_LOAD_LIMIT: usize = 100;

/// Service-level errors for notification tracking.
#[derive(Debug, Error)]
pub enum NotificationServiceError {
    /// Payload validation failed.
    #[error(transparent)]
    Domain(#[from] NotificationDomainError),
    /// The notification store failed.
    #[error(transparent)]
    Store(#[from] NotificationStoreError),
    /// Device-local state failed.
    #[error(transparent)]
    Local(#[from] LocalStateError),
}

/// Result type for notification tracker operations.
pub type NotificationServiceResult<T> = Result<T, NotificationServiceError>;

/// Where the list shown after a load came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// Fresh from the store.
    Remote,
    /// The store failed; the cached list is shown.
    Cache,
}

/// Visible notifications and the unread badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// Visible notifications, newest first.
    pub items: Vec<FeedItem>,
    /// Visible notifications not read on this device.
    pub unread_count: usize,
}

/// Request payload for creating a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNotificationRequest {
    kind: NotificationKind,
    title: String,
    message: String,
    job_id: Option<JobId>,
}

impl CreateNotificationRequest {
    /// Creates a `system` notification request.
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::System,
            title: title.into(),
            message: message.into(),
            job_id: None,
        }
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_kind(mut self, kind: NotificationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Links the notification to a job.
    #[must_use]
    pub const fn with_job(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }
}

/// Notification tracker service.
pub struct NotificationTracker<R, C>
where
    R: NotificationRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    local: Arc<dyn LocalStateStore>,
    alerter: Arc<dyn DesktopAlerter>,
    clock: Arc<C>,
    feed: Mutex<NotificationFeed>,
    remote_timeout: Duration,
}

impl<R, C> NotificationTracker<R, C>
where
    R: NotificationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a tracker, restoring the read and hidden sets from local
    /// state.
    ///
    /// A malformed stored set is discarded with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Local`] when local storage
    /// cannot be read.
    pub fn new(
        repository: Arc<R>,
        local: Arc<dyn LocalStateStore>,
        alerter: Arc<dyn DesktopAlerter>,
        clock: Arc<C>,
    ) -> NotificationServiceResult<Self> {
        let read = load_id_set(local.as_ref(), LocalKey::ReadNotifications)?;
        let hidden = load_id_set(local.as_ref(), LocalKey::HiddenNotifications)?;
        Ok(Self {
            repository,
            local,
            alerter,
            clock,
            feed: Mutex::new(NotificationFeed::with_overlays(read, hidden)),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        })
    }

    /// Sets the deadline applied to store calls.
    #[must_use]
    pub const fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    fn feed(&self) -> MutexGuard<'_, NotificationFeed> {
        self.feed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads the most recent notifications, falling back to the cached list
    /// when the store fails.
    ///
    /// # Errors
    ///
    /// Returns the store error when the store fails and no cache exists.
    #[instrument(skip(self))]
    pub async fn load(&self) -> NotificationServiceResult<LoadSource> {
        let seen_before = self.feed().last_seen();
        match bounded(
            self.remote_timeout,
            self.repository.list_recent(INITIAL_LOAD_LIMIT),
        )
        .await
        {
            Ok(notifications) => {
                save_json(self.local.as_ref(), LocalKey::NotificationsCache, &notifications)?;
                self.feed().replace_all(notifications, seen_before);
                Ok(LoadSource::Remote)
            }
            Err(err) => {
                warn!(error = %err, "loading notifications failed, using cache");
                let cached: Option<Vec<Notification>> =
                    load_json(self.local.as_ref(), LocalKey::NotificationsCache)?;
                let notifications = cached.ok_or(err)?;
                self.feed().replace_all(notifications, seen_before);
                Ok(LoadSource::Cache)
            }
        }
    }

    /// Fetches notifications newer than the highest id seen and ingests
    /// them; performs a full load when nothing was seen yet.
    ///
    /// Returns how many notifications were added to the list.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Store`] when the store fails.
    #[instrument(skip(self))]
    pub async fn poll_once(&self) -> NotificationServiceResult<usize> {
        let last_seen = self.feed().last_seen();
        let fetched = match last_seen {
            Some(after) => {
                bounded(self.remote_timeout, self.repository.list_after(after)).await?
            }
            None => {
                bounded(
                    self.remote_timeout,
                    self.repository.list_recent(INITIAL_LOAD_LIMIT),
                )
                .await?
            }
        };
        let added = fetched
            .into_iter()
            .map(|notification| self.ingest(notification))
            .filter(|outcome| matches!(outcome, IngestOutcome::Added { .. }))
            .count();
        if added > 0 {
            self.persist_cache()?;
            debug!(added, "new notifications ingested");
        }
        Ok(added)
    }

    /// Merges one notification delivered by a poll or a push.
    ///
    /// Hidden and already listed ids are dropped. An unread addition raises
    /// a desktop alert when the user granted permission.
    pub fn ingest(&self, notification: Notification) -> IngestOutcome {
        let title = notification.title.clone();
        let body = notification.message.clone();
        let outcome = self.feed().ingest(notification);
        if outcome.should_alert() && self.alerter.permission() == AlertPermission::Granted {
            self.alerter.show(&title, &body);
        }
        outcome
    }

    /// Ingests a pushed notification and refreshes the cached list when it
    /// was added.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Local`] when the cache cannot be
    /// written.
    pub fn accept_push(
        &self,
        notification: Notification,
    ) -> NotificationServiceResult<IngestOutcome> {
        let outcome = self.ingest(notification);
        if matches!(outcome, IngestOutcome::Added { .. }) {
            self.persist_cache()?;
        }
        Ok(outcome)
    }

    /// Marks one notification, or all visible ones, as read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Local`] when the read set cannot
    /// be persisted.
    pub fn mark_as_read(&self, id: Option<NotificationId>) -> NotificationServiceResult<()> {
        let read = {
            let mut feed = self.feed();
            if !feed.mark_as_read(id) {
                return Ok(());
            }
            feed.read_ids().clone()
        };
        save_json(self.local.as_ref(), LocalKey::ReadNotifications, &read)?;
        Ok(())
    }

    /// Hides one notification on this device.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Local`] when the hidden set
    /// cannot be persisted.
    pub fn delete(&self, id: NotificationId) -> NotificationServiceResult<()> {
        let hidden = {
            let mut feed = self.feed();
            feed.hide(id);
            feed.hidden_ids().clone()
        };
        save_json(self.local.as_ref(), LocalKey::HiddenNotifications, &hidden)?;
        Ok(())
    }

    /// Hides every visible notification on this device.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Local`] when the hidden set
    /// cannot be persisted.
    pub fn clear_all(&self) -> NotificationServiceResult<()> {
        let hidden = {
            let mut feed = self.feed();
            feed.hide_all();
            feed.hidden_ids().clone()
        };
        save_json(self.local.as_ref(), LocalKey::HiddenNotifications, &hidden)?;
        Ok(())
    }

    /// Un-hides every notification and reloads the list.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError`] when local state or the reload
    /// fails.
    #[instrument(skip(self))]
    pub async fn restore_hidden(&self) -> NotificationServiceResult<LoadSource> {
        self.feed().restore_hidden();
        self.local.remove(LocalKey::HiddenNotifications)?;
        info!("hidden notifications restored");
        self.load().await
    }

    /// Forgets read, hidden and cached notifications, then reloads.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError`] when local state or the reload
    /// fails.
    #[instrument(skip(self))]
    pub async fn clear_local_data(&self) -> NotificationServiceResult<LoadSource> {
        self.feed().reset();
        for key in [
            LocalKey::ReadNotifications,
            LocalKey::HiddenNotifications,
            LocalKey::NotificationsCache,
        ] {
            self.local.remove(key)?;
        }
        info!("local notification data cleared");
        self.load().await
    }

    /// Returns the visible list and unread count.
    #[must_use]
    pub fn snapshot(&self) -> FeedSnapshot {
        let feed = self.feed();
        FeedSnapshot {
            items: feed.visible(),
            unread_count: feed.unread_count(),
        }
    }

    /// Writes a notification to the store and lists it locally.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError`] when validation or the store
    /// fails.
    #[instrument(skip(self, request), fields(kind = %request.kind))]
    pub async fn create(
        &self,
        request: CreateNotificationRequest,
    ) -> NotificationServiceResult<Notification> {
        let mut new_notification =
            NewNotification::new(request.kind, request.title, request.message, &*self.clock)?;
        if let Some(job_id) = request.job_id {
            new_notification = new_notification.with_job(job_id);
        }
        let stored = bounded(
            self.remote_timeout,
            self.repository.insert(&new_notification),
        )
        .await?;
        self.ingest(stored.clone());
        self.persist_cache()?;
        Ok(stored)
    }

    fn persist_cache(&self) -> NotificationServiceResult<()> {
        let listed = self.feed().notifications().to_vec();
        save_json(self.local.as_ref(), LocalKey::NotificationsCache, &listed)?;
        Ok(())
    }
}

fn load_id_set(
    local: &dyn LocalStateStore,
    key: LocalKey,
) -> NotificationServiceResult<BTreeSet<NotificationId>> {
    match load_json::<BTreeSet<NotificationId>>(local, key) {
        Ok(ids) => Ok(ids.unwrap_or_default()),
        Err(LocalStateError::Malformed { key: name, source }) => {
            warn!(key = name, error = %source, "discarding malformed local id set");
            Ok(BTreeSet::new())
        }
        Err(err) => Err(err.into()),
    }
}
