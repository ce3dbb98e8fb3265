//! Port contracts for notifications.

pub mod alert;
pub mod feed_source;
pub mod repository;

pub use alert::{AlertPermission, DesktopAlerter, SilentAlerter};
pub use feed_source::{NotificationFeedSource, PUSH_CHANNEL_CAPACITY};
pub use repository::{NotificationRepository, NotificationStoreError, NotificationStoreResult};
