//! Orchestration services for notifications.

pub mod poller;
pub mod subscriber;
pub mod tracker;

pub use poller::{DEFAULT_POLL_INTERVAL, NotificationPoller, PageVisibility, PollerStatus};
pub use subscriber::NotificationSubscriber;
pub use tracker::{
    CreateNotificationRequest, FeedSnapshot, INITIAL_LOAD_LIMIT, LoadSource,
    NotificationServiceError, NotificationServiceResult, NotificationTracker,
};
