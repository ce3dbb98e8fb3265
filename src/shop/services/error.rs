//! Errors shared by the shop-floor services.

use crate::shop::{domain::ShopDomainError, ports::ShopStoreError};
use std::fmt;
use thiserror::Error;

/// Last write of a multi-step save that reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    /// The cutting log was written.
    Log,
    /// The log and the detail counts were written.
    Details,
}

impl fmt::Display for SaveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Log => "cutting log",
            Self::Details => "job details",
        })
    }
}

/// Service-level errors for shop-floor operations.
///
/// Store responses that report a broken uniqueness or usage rule are
/// surfaced as [`ShopServiceError::Domain`], the same error the
/// read-before-write check raises, so a lost race looks like any other
/// validation failure.
#[derive(Debug, Clone, Error)]
pub enum ShopServiceError {
    /// Domain validation failed; nothing was written.
    #[error(transparent)]
    Domain(#[from] ShopDomainError),
    /// The store rejected the request or could not be reached.
    #[error(transparent)]
    Store(ShopStoreError),
    /// A later step of a save failed after earlier steps were stored.
    #[error("save partially applied; {completed} stored before failure: {source}")]
    PartialSave {
        /// Last step that reached the store.
        completed: SaveStep,
        /// Failure of the following step.
        source: ShopStoreError,
    },
}

impl ShopServiceError {
    /// Returns whether repeating the request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Store(err) | Self::PartialSave { source: err, .. } => err.is_retryable(),
            Self::Domain(_) => false,
        }
    }
}

impl From<ShopStoreError> for ShopServiceError {
    fn from(err: ShopStoreError) -> Self {
        match err {
            ShopStoreError::DuplicateArticleNumber(number) => {
                Self::Domain(ShopDomainError::DuplicateArticleNumber(number))
            }
            ShopStoreError::DuplicateJobArticle { article_id, .. } => {
                Self::Domain(ShopDomainError::DuplicateJobArticle(article_id))
            }
            ShopStoreError::ProgramAlreadyExists(job_id) => {
                Self::Domain(ShopDomainError::ProgramAlreadyExists(job_id))
            }
            ShopStoreError::ArticleInUse(article_id) => {
                Self::Domain(ShopDomainError::ArticleInUse(article_id))
            }
            other => Self::Store(other),
        }
    }
}

/// Result type for shop-floor service operations.
pub type ShopServiceResult<T> = Result<T, ShopServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::domain::{ArticleNumber, JobId};
    use std::time::Duration;

    #[test]
    fn late_duplicate_number_reads_as_validation_error() {
        let number = ArticleNumber::new("A-100").expect("number");
        let err = ShopServiceError::from(ShopStoreError::DuplicateArticleNumber(number.clone()));
        assert!(matches!(
            err,
            ShopServiceError::Domain(ShopDomainError::DuplicateArticleNumber(found)) if found == number
        ));
    }

    #[test]
    fn timeouts_stay_retryable_through_partial_saves() {
        let err = ShopServiceError::PartialSave {
            completed: SaveStep::Log,
            source: ShopStoreError::Timeout(Duration::from_secs(10)),
        };
        assert!(err.is_retryable());
        assert!(!ShopServiceError::from(ShopStoreError::JobNotFound(JobId::new(1))).is_retryable());
    }
}
