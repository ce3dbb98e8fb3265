//! Background polling fallback for notifications.
//!
//! The poller asks the tracker for notifications newer than the highest id
//! seen on a fixed period. Each poll is awaited before the next tick is
//! taken, so requests never overlap. Polling pauses while the host page is
//! hidden and polls once immediately when it becomes visible again.

use super::NotificationTracker;
use crate::notification::ports::NotificationRepository;
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Whether the host page is currently shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageVisibility {
    /// The page is in the foreground.
    #[default]
    Visible,
    /// The page is hidden; polling is suspended.
    Hidden,
}

/// Snapshot of the poller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerStatus {
    /// Whether a polling task is active.
    pub running: bool,
    /// Polling period.
    pub interval: Duration,
}

struct RunningPoll {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Start/stop handle for the polling task.
pub struct NotificationPoller {
    interval: Duration,
    running: Mutex<Option<RunningPoll>>,
}

impl NotificationPoller {
    /// Creates a stopped poller with the given period.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: Mutex::new(None),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<RunningPoll>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns the polling task.
    ///
    /// Returns `false` without spawning when a task is already running.
    /// Must be called within a Tokio runtime.
    #[must_use = "a refused start leaves the earlier task in charge"]
    pub fn start<R, C>(
        &self,
        tracker: Arc<NotificationTracker<R, C>>,
        visibility: watch::Receiver<PageVisibility>,
    ) -> bool
    where
        R: NotificationRepository + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|poll| !poll.handle.is_finished()) {
            return false;
        }
        let token = CancellationToken::new();
        let handle = tokio::spawn(run(tracker, visibility, token.clone(), self.interval));
        *slot = Some(RunningPoll { token, handle });
        info!(interval_secs = self.interval.as_secs(), "notification polling started");
        true
    }

    /// Cancels the polling task. Safe to call repeatedly or when idle.
    pub fn stop(&self) {
        if let Some(poll) = self.slot().take() {
            poll.token.cancel();
            info!("notification polling stopped");
        }
    }

    /// Returns whether a polling task is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|poll| !poll.handle.is_finished())
    }

    /// Reports the poller state.
    #[must_use]
    pub fn status(&self) -> PollerStatus {
        PollerStatus {
            running: self.is_running(),
            interval: self.interval,
        }
    }
}

impl Default for NotificationPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run<R, C>(
    tracker: Arc<NotificationTracker<R, C>>,
    mut visibility: watch::Receiver<PageVisibility>,
    token: CancellationToken,
    period: Duration,
) where
    R: NotificationRepository,
    C: Clock + Send + Sync,
{
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let visible = *visibility.borrow_and_update() == PageVisibility::Visible;
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            changed = visibility.changed() => {
                if changed.is_err() {
                    debug!("visibility source closed; polling ends");
                    break;
                }
                if *visibility.borrow() == PageVisibility::Visible && !visible {
                    debug!("page visible again; polling resumed");
                    if !poll(&tracker, &token).await {
                        break;
                    }
                    ticks.reset();
                }
            }
            _ = ticks.tick(), if visible => {
                if !poll(&tracker, &token).await {
                    break;
                }
            }
        }
    }
}

/// Runs one poll; returns `false` when cancelled mid-request.
async fn poll<R, C>(tracker: &NotificationTracker<R, C>, token: &CancellationToken) -> bool
where
    R: NotificationRepository,
    C: Clock + Send + Sync,
{
    tokio::select! {
        biased;
        () = token.cancelled() => false,
        result = tracker.poll_once() => {
            if let Err(err) = result {
                warn!(error = %err, "notification poll failed");
            }
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_state::InMemoryLocalState;
    use crate::notification::adapters::memory::InMemoryNotificationStore;
    use crate::notification::domain::{NewNotification, NotificationKind};
    use crate::notification::ports::SilentAlerter;
    use mockable::DefaultClock;

    type Tracker = NotificationTracker<InMemoryNotificationStore, DefaultClock>;

    fn tracker(store: &InMemoryNotificationStore) -> Arc<Tracker> {
        Arc::new(
            NotificationTracker::new(
                Arc::new(store.clone()),
                Arc::new(InMemoryLocalState::new()),
                Arc::new(SilentAlerter),
                Arc::new(DefaultClock),
            )
            .expect("tracker"),
        )
    }

    async fn publish(store: &InMemoryNotificationStore, title: &str) {
        let notification =
            NewNotification::new(NotificationKind::System, title, "", &DefaultClock)
                .expect("notification");
        store.insert(&notification).await.expect("insert");
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_each_period() {
        let store = InMemoryNotificationStore::new();
        let tracker = tracker(&store);
        let poller = NotificationPoller::new(Duration::from_secs(15));
        let (_visibility, receiver) = watch::channel(PageVisibility::Visible);
        assert!(poller.start(Arc::clone(&tracker), receiver));

        publish(&store, "first").await;
        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(tracker.snapshot().items.len(), 1);

        publish(&store, "second").await;
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(tracker.snapshot().items.len(), 2);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_page_suspends_polling_until_visible() {
        let store = InMemoryNotificationStore::new();
        let tracker = tracker(&store);
        let poller = NotificationPoller::new(Duration::from_secs(15));
        let (visibility, receiver) = watch::channel(PageVisibility::Hidden);
        assert!(poller.start(Arc::clone(&tracker), receiver));

        publish(&store, "while hidden").await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(tracker.snapshot().items.is_empty());

        visibility.send(PageVisibility::Visible).expect("send");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(tracker.snapshot().items.len(), 1);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_safe_when_idle() {
        let store = InMemoryNotificationStore::new();
        let poller = NotificationPoller::default();
        poller.stop();

        let (_visibility, receiver) = watch::channel(PageVisibility::Visible);
        assert!(poller.start(tracker(&store), receiver));
        assert!(poller.status().running);
        poller.stop();
        poller.stop();
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_refused_while_running() {
        let store = InMemoryNotificationStore::new();
        let poller = NotificationPoller::default();
        let (_visibility, receiver) = watch::channel(PageVisibility::Visible);
        assert!(poller.start(tracker(&store), receiver.clone()));
        assert!(!poller.start(tracker(&store), receiver));
        poller.stop();
    }
}
