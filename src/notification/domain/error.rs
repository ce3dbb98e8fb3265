//! Validation errors for notifications.

use super::NotificationKind;
use thiserror::Error;

/// Notification payload failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationDomainError {
    /// The headline is empty after trimming.
    #[error("notification title must not be empty")]
    EmptyTitle,

    /// The stored category is not recognised.
    #[error("unknown notification type: {0}")]
    UnknownKind(String),

    /// A message template failed to render.
    #[error("failed to render {kind} notification: {reason}")]
    TemplateRender {
        /// Category being rendered.
        kind: NotificationKind,
        /// Renderer message.
        reason: String,
    },
}
