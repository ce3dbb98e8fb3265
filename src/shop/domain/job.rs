//! Cutting job aggregate and its status lifecycle.

use super::{JobId, ParseJobStatusError, ShopDomainError};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cutting job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting in the cutting queue.
    Queued,
    /// A program exists and the operator is cutting.
    InProgress,
    /// Cutting finished; terminal.
    Done,
    /// Temporarily halted.
    Paused,
    /// Abandoned; terminal.
    Cancelled,
}

impl JobStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Queued,
        Self::InProgress,
        Self::Done,
        Self::Paused,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns the label shown on the shop floor.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Queued => "В черзі",
            Self::InProgress => "В роботі",
            Self::Done => "Виконано",
            Self::Paused => "Призупинено",
            Self::Cancelled => "Скасовано",
        }
    }

    /// Returns whether no further transition is defined.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Returns whether moving to `target` is part of the lifecycle.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Queued,
                Self::InProgress | Self::Paused | Self::Cancelled
            ) | (
                Self::InProgress,
                Self::Done | Self::Paused | Self::Cancelled
            ) | (Self::Paused, Self::InProgress | Self::Cancelled)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for JobStatus {
    type Error = ParseJobStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if let Some(status) = Self::ALL.into_iter().find(|status| status.label() == trimmed) {
            return Ok(status);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "queued" => Ok(Self::Queued),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "paused" => Ok(Self::Paused),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseJobStatusError(value.to_owned())),
        }
    }
}

/// Insert payload for a new cutting job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCuttingJob {
    /// Planned completion date.
    pub due_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: String,
    /// Initial status, always [`JobStatus::Queued`].
    pub status: JobStatus,
    /// Submission timestamp.
    pub creation_date: DateTime<Utc>,
}

impl NewCuttingJob {
    /// Creates a queued job stamped with the current time.
    #[must_use]
    pub fn new(due_date: Option<NaiveDate>, notes: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            due_date,
            notes: notes.into(),
            status: JobStatus::Queued,
            creation_date: clock.utc(),
        }
    }
}

/// Cutting job aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuttingJob {
    id: JobId,
    status: JobStatus,
    due_date: Option<NaiveDate>,
    notes: String,
    creation_date: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedJobData {
    /// Store-assigned key.
    pub id: JobId,
    /// Persisted status.
    pub status: JobStatus,
    /// Persisted due date.
    pub due_date: Option<NaiveDate>,
    /// Persisted notes.
    pub notes: String,
    /// Persisted creation timestamp.
    pub creation_date: DateTime<Utc>,
}

impl CuttingJob {
    /// Reconstructs a job from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedJobData) -> Self {
        Self {
            id: data.id,
            status: data.status,
            due_date: data.due_date,
            notes: data.notes,
            creation_date: data.creation_date,
        }
    }

    /// Returns the job key.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// Returns the planned completion date.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Returns the submission timestamp.
    #[must_use]
    pub const fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    /// Replaces the due date and notes.
    pub fn edit_details(&mut self, due_date: Option<NaiveDate>, notes: impl Into<String>) {
        self.due_date = due_date;
        self.notes = notes.into();
    }

    /// Ensures moving to `target` is allowed without changing the job.
    ///
    /// Staying in the current status is always accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ShopDomainError::InvalidStatusTransition`] when the lifecycle
    /// does not define the move.
    pub fn ensure_can_transition_to(&self, target: JobStatus) -> Result<(), ShopDomainError> {
        if target == self.status || self.status.can_transition_to(target) {
            return Ok(());
        }
        Err(ShopDomainError::InvalidStatusTransition {
            job_id: self.id,
            from: self.status,
            to: target,
        })
    }

    /// Moves the job to `target`.
    ///
    /// Returns `true` when the status actually changed.
    ///
    /// # Errors
    ///
    /// Returns [`ShopDomainError::InvalidStatusTransition`] when the lifecycle
    /// does not define the move.
    pub fn transition_to(&mut self, target: JobStatus) -> Result<bool, ShopDomainError> {
        self.ensure_can_transition_to(target)?;
        let changed = self.status != target;
        self.status = target;
        Ok(changed)
    }
}
