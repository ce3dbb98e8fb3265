//! Bill-of-materials rows linking jobs to articles.

use super::{Article, ArticleId, JobDetailId, JobId, ShopDomainError};
use serde::{Deserialize, Serialize};

/// Planned quantity of an article within a job, at least one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlannedQuantity(u32);

impl PlannedQuantity {
    /// Validates a planned quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ShopDomainError::InvalidQuantity`] for values below one or
    /// beyond the storable range.
    pub fn new(value: i64) -> Result<Self, ShopDomainError> {
        u32::try_from(value)
            .ok()
            .filter(|quantity| *quantity >= 1 && i32::try_from(*quantity).is_ok())
            .map(Self)
            .ok_or(ShopDomainError::InvalidQuantity(value))
    }

    /// Returns the number of pieces.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

/// Actual and rejected piece counts recorded by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetailCounts {
    /// Pieces actually cut; `None` when the input was left empty.
    pub quantity_actual: Option<u32>,
    /// Rejected pieces; `None` when the input was left empty.
    pub rejection_count: Option<u32>,
}

impl DetailCounts {
    /// Counts stored for a freshly planned row.
    pub const ZERO: Self = Self {
        quantity_actual: Some(0),
        rejection_count: Some(0),
    };

    /// Parses operator inputs: empty stays `None`, anything unparsable
    /// becomes zero.
    #[must_use]
    pub fn parse(actual: &str, rejected: &str) -> Self {
        Self {
            quantity_actual: parse_count(actual),
            rejection_count: parse_count(rejected),
        }
    }
}

fn parse_count(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.parse::<u32>().unwrap_or(0))
}

/// Insert payload for a job detail row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewJobDetail {
    /// Owning job.
    pub job_id: JobId,
    /// Planned article.
    pub article_id: ArticleId,
    /// Planned pieces.
    pub quantity_planned: PlannedQuantity,
    /// Initial counts, [`DetailCounts::ZERO`] for new rows.
    pub counts: DetailCounts,
}

impl NewJobDetail {
    /// Creates a row with zero actual and rejected pieces.
    #[must_use]
    pub const fn planned(job_id: JobId, article_id: ArticleId, quantity: PlannedQuantity) -> Self {
        Self {
            job_id,
            article_id,
            quantity_planned: quantity,
            counts: DetailCounts::ZERO,
        }
    }
}

/// Stored job detail row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetail {
    /// Store-assigned key.
    pub id: JobDetailId,
    /// Owning job.
    pub job_id: JobId,
    /// Planned article.
    pub article_id: ArticleId,
    /// Planned pieces.
    pub quantity_planned: PlannedQuantity,
    /// Recorded counts.
    pub counts: DetailCounts,
}

/// Detail row joined with its article for display.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDetailLine {
    /// The stored row.
    pub detail: JobDetail,
    /// The referenced article, absent when it was removed concurrently.
    pub article: Option<Article>,
}
