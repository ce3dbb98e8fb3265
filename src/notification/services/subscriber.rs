//! Live push delivery of notifications.
//!
//! The subscriber forwards every notification a [`NotificationFeedSource`]
//! pushes into [`NotificationTracker::accept_push`]. When the receiver falls
//! behind, the skipped inserts are recovered with one poll. The poller keeps
//! running beside it and covers sources that drop the connection.

use super::{NotificationServiceResult, NotificationTracker};
use crate::notification::domain::{IngestOutcome, Notification};
use crate::notification::ports::{NotificationFeedSource, NotificationRepository};
use crate::remote::bounded;
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct RunningSubscription {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Start/stop handle for the push forwarding task.
#[derive(Default)]
pub struct NotificationSubscriber {
    running: Mutex<Option<RunningSubscription>>,
}

impl NotificationSubscriber {
    /// Creates a stopped subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<RunningSubscription>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a subscription on `source` and spawns the forwarding task.
    ///
    /// Returns `false` without subscribing when a task is already running.
    /// Pushes stored after this returns reach the tracker. Must be called
    /// within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`super::NotificationServiceError::Store`] when the
    /// subscription cannot be opened in time.
    pub async fn start<S, R, C>(
        &self,
        source: &S,
        tracker: Arc<NotificationTracker<R, C>>,
        timeout: Duration,
    ) -> NotificationServiceResult<bool>
    where
        S: NotificationFeedSource + ?Sized,
        R: NotificationRepository + 'static,
        C: Clock + Send + Sync + 'static,
    {
        if self.is_running() {
            return Ok(false);
        }
        let receiver = bounded(timeout, source.subscribe()).await?;
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|running| !running.handle.is_finished()) {
            return Ok(false);
        }
        let token = CancellationToken::new();
        let handle = tokio::spawn(forward(tracker, receiver, token.clone()));
        *slot = Some(RunningSubscription { token, handle });
        info!("notification push subscription started");
        Ok(true)
    }

    /// Cancels the forwarding task. Safe to call repeatedly or when idle.
    pub fn stop(&self) {
        if let Some(running) = self.slot().take() {
            running.token.cancel();
            info!("notification push subscription stopped");
        }
    }

    /// Returns whether a forwarding task is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }
}

impl Drop for NotificationSubscriber {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn forward<R, C>(
    tracker: Arc<NotificationTracker<R, C>>,
    mut receiver: broadcast::Receiver<Notification>,
    token: CancellationToken,
) where
    R: NotificationRepository,
    C: Clock + Send + Sync,
{
    loop {
        let received = tokio::select! {
            biased;
            () = token.cancelled() => break,
            received = receiver.recv() => received,
        };
        match received {
            Ok(notification) => {
                let id = notification.id;
                match tracker.accept_push(notification) {
                    Ok(IngestOutcome::Added { .. }) => debug!(%id, "pushed notification added"),
                    Ok(_) => {}
                    Err(err) => warn!(%id, error = %err, "pushed notification not cached"),
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "push subscription lagged; polling to catch up");
                if let Err(err) = tracker.poll_once().await {
                    warn!(error = %err, "catch-up poll failed");
                }
            }
            Err(RecvError::Closed) => {
                debug!("push source closed; subscription ends");
                break;
            }
        }
    }
}
