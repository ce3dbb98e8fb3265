//! Repository ports for the shop-floor tables.
//!
//! Each table gets its own trait so services can depend on the narrowest
//! contract; [`ShopStore`] bundles them for adapters that serve all tables
//! from one connection.

use crate::shop::domain::{
    Article, ArticleDraft, ArticleId, ArticleNumber, ArticleQuery, CuttingJob, CuttingLogEntry,
    CuttingProgram, DetailCounts, JobDetail, JobDetailId, JobDetailLine, JobId, JobQuery,
    JobStatus, LogEntryId, LogUpdate, NewCuttingJob, NewCuttingLogEntry, NewCuttingProgram,
    NewJobDetail, PlannedQuantity, ProgramFileName, ProgramId,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for shop store operations.
pub type ShopStoreResult<T> = Result<T, ShopStoreError>;

/// `cutting_jobs` persistence contract.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Inserts a job and returns it with its assigned key.
    async fn insert_job(&self, job: &NewCuttingJob) -> ShopStoreResult<CuttingJob>;

    /// Finds a job by key.
    async fn find_job(&self, id: JobId) -> ShopStoreResult<Option<CuttingJob>>;

    /// Lists jobs matching `query`, highest key first.
    async fn list_jobs(&self, query: &JobQuery) -> ShopStoreResult<Vec<CuttingJob>>;

    /// Overwrites due date, notes and status of an existing job.
    ///
    /// # Errors
    ///
    /// Returns [`ShopStoreError::JobNotFound`] when the job does not exist.
    async fn update_job(&self, job: &CuttingJob) -> ShopStoreResult<()>;

    /// Sets the status column only.
    ///
    /// # Errors
    ///
    /// Returns [`ShopStoreError::JobNotFound`] when the job does not exist.
    async fn update_job_status(&self, id: JobId, status: JobStatus) -> ShopStoreResult<()>;

    /// Deletes a job together with its details, programs and logs.
    ///
    /// # Errors
    ///
    /// Returns [`ShopStoreError::JobNotFound`] when the job does not exist.
    async fn delete_job(&self, id: JobId) -> ShopStoreResult<()>;
}

/// `articles` persistence contract.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Inserts an article.
    ///
    /// # Errors
    ///
    /// Returns [`ShopStoreError::DuplicateArticleNumber`] when the number is
    /// taken.
    async fn insert_article(&self, draft: &ArticleDraft) -> ShopStoreResult<Article>;

    /// Overwrites an article.
    ///
    /// # Errors
    ///
    /// Returns [`ShopStoreError::ArticleNotFound`] for unknown keys and
    /// [`ShopStoreError::DuplicateArticleNumber`] when another article holds
    /// the number.
    async fn update_article(&self, id: ArticleId, draft: &ArticleDraft)
    -> ShopStoreResult<Article>;

    /// Deletes an article.
    ///
    /// # Errors
    ///
    /// Returns [`ShopStoreError::ArticleInUse`] when job details still
    /// reference it.
    async fn delete_article(&self, id: ArticleId) -> ShopStoreResult<()>;

    /// Finds an article by key.
    async fn find_article(&self, id: ArticleId) -> ShopStoreResult<Option<Article>>;

    /// Finds an article by its catalog number.
    async fn find_article_by_number(
        &self,
        number: &ArticleNumber,
    ) -> ShopStoreResult<Option<Article>>;

    /// Lists articles.
    async fn list_articles(&self, query: &ArticleQuery) -> ShopStoreResult<Vec<Article>>;

    /// Counts job details referencing the article.
    async fn count_article_usage(&self, id: ArticleId) -> ShopStoreResult<u64>;
}

/// `job_details` persistence contract.
#[async_trait]
pub trait JobDetailRepository: Send + Sync {
    /// Inserts all rows in one request.
    ///
    /// # Errors
    ///
    /// Returns [`ShopStoreError::DuplicateJobArticle`] when an article is
    /// listed twice for a job; no row is stored in that case.
    async fn insert_details(&self, details: &[NewJobDetail]) -> ShopStoreResult<Vec<JobDetail>>;

    /// Lists a job's details joined with their articles, in key order.
    async fn list_details(&self, job_id: JobId) -> ShopStoreResult<Vec<JobDetailLine>>;

    /// Overwrites the recorded counts of one row.
    async fn update_detail_counts(
        &self,
        id: JobDetailId,
        counts: DetailCounts,
    ) -> ShopStoreResult<()>;

    /// Overwrites the planned quantity of one row.
    async fn update_planned_quantity(
        &self,
        id: JobDetailId,
        quantity: PlannedQuantity,
    ) -> ShopStoreResult<()>;

    /// Removes one row.
    async fn delete_detail(&self, id: JobDetailId) -> ShopStoreResult<()>;
}

/// `cutting_programs` persistence contract.
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Inserts the job's program.
    ///
    /// # Errors
    ///
    /// Returns [`ShopStoreError::ProgramAlreadyExists`] when the job has one.
    async fn insert_program(&self, program: &NewCuttingProgram)
    -> ShopStoreResult<CuttingProgram>;

    /// Finds the job's program.
    async fn find_program_for_job(&self, job_id: JobId) -> ShopStoreResult<Option<CuttingProgram>>;

    /// Lists every program row of the job.
    async fn list_programs(&self, job_id: JobId) -> ShopStoreResult<Vec<CuttingProgram>>;

    /// Renames a program.
    async fn rename_program(
        &self,
        id: ProgramId,
        file_name: &ProgramFileName,
    ) -> ShopStoreResult<CuttingProgram>;
}

/// `cutting_log` persistence contract.
#[async_trait]
pub trait CuttingLogRepository: Send + Sync {
    /// Inserts the first log of a program.
    async fn insert_log(&self, entry: &NewCuttingLogEntry) -> ShopStoreResult<CuttingLogEntry>;

    /// Overwrites an existing log.
    ///
    /// # Errors
    ///
    /// Returns [`ShopStoreError::LogNotFound`] when the row does not exist.
    async fn update_log(&self, update: &LogUpdate) -> ShopStoreResult<CuttingLogEntry>;

    /// Returns the program's log with the latest `start_time`.
    async fn latest_log(&self, program_id: ProgramId) -> ShopStoreResult<Option<CuttingLogEntry>>;

    /// Lists every log row of the program.
    async fn list_logs(&self, program_id: ProgramId) -> ShopStoreResult<Vec<CuttingLogEntry>>;
}

/// Every shop-floor table behind one handle.
pub trait ShopStore:
    JobRepository + ArticleRepository + JobDetailRepository + ProgramRepository + CuttingLogRepository
{
}

impl<T> ShopStore for T where
    T: JobRepository
        + ArticleRepository
        + JobDetailRepository
        + ProgramRepository
        + CuttingLogRepository
{
}

/// Errors returned by shop store implementations.
#[derive(Debug, Clone, Error)]
pub enum ShopStoreError {
    /// The article number is already used.
    #[error("duplicate article number: {0}")]
    DuplicateArticleNumber(ArticleNumber),

    /// The article is already listed for the job.
    #[error("article {article_id} is already part of job {job_id}")]
    DuplicateJobArticle {
        /// Owning job.
        job_id: JobId,
        /// Repeated article.
        article_id: ArticleId,
    },

    /// The job already has a cutting program.
    #[error("job {0} already has a cutting program")]
    ProgramAlreadyExists(JobId),

    /// The article is referenced by job details.
    #[error("article {0} is referenced by job details")]
    ArticleInUse(ArticleId),

    /// The job was not found.
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// The article was not found.
    #[error("article not found: {0}")]
    ArticleNotFound(ArticleId),

    /// The job detail was not found.
    #[error("job detail not found: {0}")]
    DetailNotFound(JobDetailId),

    /// The program was not found.
    #[error("cutting program not found: {0}")]
    ProgramNotFound(ProgramId),

    /// The log entry was not found.
    #[error("cutting log entry not found: {0}")]
    LogNotFound(LogEntryId),

    /// The store did not answer in time.
    #[error("store request timed out after {0:?}")]
    Timeout(Duration),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ShopStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns whether repeating the request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<crate::remote::RemoteTimeout> for ShopStoreError {
    fn from(timeout: crate::remote::RemoteTimeout) -> Self {
        Self::Timeout(timeout.after())
    }
}
