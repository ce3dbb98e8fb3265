//! Notification records, message templates and the local feed overlay.

mod error;
mod feed;
mod notification;
pub mod templates;

pub use error::NotificationDomainError;
pub use feed::{FeedItem, IngestOutcome, NotificationFeed};
pub use notification::{NewNotification, Notification, NotificationId, NotificationKind};
pub use templates::{NotificationTemplate, RenderedNotification};
