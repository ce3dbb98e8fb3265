//! Validation errors for the shop-floor domain.

use super::{ArticleId, ArticleNumber, JobId, JobStatus};
use thiserror::Error;

/// Client-side precondition failures.
///
/// Every variant is raised before a write is sent to the store; the caller
/// keeps its form state so the user can correct the input and retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShopDomainError {
    /// A log is being started without an operator or a start meter reading.
    #[error("missing operator/start meter")]
    MissingOperatorOrStartMeter,

    /// Completion requires an end meter strictly above the start meter.
    #[error("end meter must exceed start meter")]
    EndMeterNotAboveStart,

    /// Log-affecting saves need a cutting program first.
    #[error("no program")]
    NoProgram,

    /// The requested status change is not part of the job lifecycle.
    #[error("invalid job status transition for job {job_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Job being transitioned.
        job_id: JobId,
        /// Current status.
        from: JobStatus,
        /// Requested status.
        to: JobStatus,
    },

    /// A job already has its cutting program.
    #[error("job {0} already has a cutting program")]
    ProgramAlreadyExists(JobId),

    /// A program file name is empty after trimming.
    #[error("program file name must not be empty")]
    EmptyProgramFileName,

    /// A planned quantity below one was supplied.
    #[error("planned quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// A job submission contains no bill-of-materials lines.
    #[error("a job must contain at least one article")]
    EmptyBillOfMaterials,

    /// The article is already listed in the job.
    #[error("article {0} is already part of the job")]
    DuplicateJobArticle(ArticleId),

    /// Another article already uses this number.
    #[error("article number {0} already exists")]
    DuplicateArticleNumber(ArticleNumber),

    /// The article is referenced by job details and cannot be removed.
    #[error("article {0} is used by jobs and cannot be deleted")]
    ArticleInUse(ArticleId),

    /// The article number is empty after trimming.
    #[error("article number must not be empty")]
    EmptyArticleNumber,

    /// The article name is empty after trimming.
    #[error("article name must not be empty")]
    EmptyArticleName,

    /// The material type is empty after trimming.
    #[error("material type must not be empty")]
    EmptyMaterialType,

    /// Thickness must be a positive number of millimetres.
    #[error("thickness must be positive, got {0}")]
    InvalidThickness(String),
}

/// Error returned while parsing job statuses from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown job status: {0}")]
pub struct ParseJobStatusError(pub String);
