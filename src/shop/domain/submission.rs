//! Draft of a new cutting job and its bill of materials.

use super::{Article, ArticleId, NewCuttingJob, PlannedQuantity, ShopDomainError};
use chrono::NaiveDate;
use mockable::Clock;

/// One planned article in a job draft.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    /// Picked article, kept for display.
    pub article: Article,
    /// Planned pieces.
    pub quantity: PlannedQuantity,
}

/// Job creation form state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobDraft {
    /// Planned completion date.
    pub due_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: String,
    lines: Vec<DraftLine>,
}

/// Validated submission split into the job row and its detail rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    /// Job insert payload.
    pub job: NewCuttingJob,
    /// Planned articles in draft order.
    pub lines: Vec<(ArticleId, PlannedQuantity)>,
}

impl JobDraft {
    /// Starts an empty bill of materials with the given header fields.
    #[must_use]
    pub fn new(due_date: Option<NaiveDate>, notes: impl Into<String>) -> Self {
        Self {
            due_date,
            notes: notes.into(),
            lines: Vec::new(),
        }
    }

    /// Returns the bill of materials in the order it was entered.
    #[must_use]
    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    /// Adds an article with a planned quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ShopDomainError::InvalidQuantity`] for quantities below one
    /// and [`ShopDomainError::DuplicateJobArticle`] when the article is
    /// already listed.
    pub fn add_line(&mut self, article: Article, pieces: i64) -> Result<(), ShopDomainError> {
        let quantity = PlannedQuantity::new(pieces)?;
        if self.contains(article.id()) {
            return Err(ShopDomainError::DuplicateJobArticle(article.id()));
        }
        self.lines.push(DraftLine { article, quantity });
        Ok(())
    }

    /// Removes the line for `article_id`; returns whether a line was removed.
    pub fn remove_line(&mut self, article_id: ArticleId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.article.id() != article_id);
        self.lines.len() != before
    }

    /// Returns whether the article is already listed.
    #[must_use]
    pub fn contains(&self, article_id: ArticleId) -> bool {
        self.lines.iter().any(|line| line.article.id() == article_id)
    }

    /// Turns the draft into insert payloads stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ShopDomainError::EmptyBillOfMaterials`] when no line was
    /// added.
    pub fn to_submission(&self, clock: &impl Clock) -> Result<JobSubmission, ShopDomainError> {
        if self.lines.is_empty() {
            return Err(ShopDomainError::EmptyBillOfMaterials);
        }
        Ok(JobSubmission {
            job: NewCuttingJob::new(self.due_date, self.notes.trim(), clock),
            lines: self
                .lines
                .iter()
                .map(|line| (line.article.id(), line.quantity))
                .collect(),
        })
    }
}
