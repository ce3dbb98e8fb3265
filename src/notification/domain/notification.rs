//! Server-side notification records.

use super::{NotificationDomainError, RenderedNotification};
use crate::shop::domain::JobId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned notification key; keys grow monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(i64);

impl NotificationId {
    /// Wraps a store-assigned key.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw key.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NotificationId {
    type Err = std::num::ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<i64>().map(Self)
    }
}

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A job was submitted.
    NewJob,
    /// A job reached `done`.
    JobCompleted,
    /// Anything else.
    #[default]
    System,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewJob => "new_job",
            Self::JobCompleted => "job_completed",
            Self::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = NotificationDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "new_job" => Ok(Self::NewJob),
            "job_completed" => Ok(Self::JobCompleted),
            "system" => Ok(Self::System),
            other => Err(NotificationDomainError::UnknownKind(other.to_owned())),
        }
    }
}

/// Insert payload for a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Category.
    pub kind: NotificationKind,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Related job, if any.
    pub job_id: Option<JobId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewNotification {
    /// Creates a notification stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::EmptyTitle`] when the title is
    /// blank.
    pub fn new(
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, NotificationDomainError> {
        let title_text = title.into().trim().to_owned();
        if title_text.is_empty() {
            return Err(NotificationDomainError::EmptyTitle);
        }
        Ok(Self {
            kind,
            title: title_text,
            message: message.into().trim().to_owned(),
            job_id: None,
            created_at: clock.utc(),
        })
    }

    /// Creates a notification from rendered template output.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::EmptyTitle`] when the rendered
    /// title is blank.
    pub fn from_rendered(
        rendered: RenderedNotification,
        clock: &impl Clock,
    ) -> Result<Self, NotificationDomainError> {
        Self::new(rendered.kind, rendered.title, rendered.message, clock)
    }

    /// Links the notification to a job.
    #[must_use]
    pub const fn with_job(mut self, job_id: JobId) -> Self {
        self.job_id = Some(job_id);
        self
    }
}

/// Stored notification; immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Store-assigned key.
    pub id: NotificationId,
    /// Category.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Related job, if any.
    pub job_id: Option<JobId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
