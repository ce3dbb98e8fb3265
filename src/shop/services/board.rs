//! Job administration table and the operator's job selection list.

use super::{ShopServiceError, ShopServiceResult};
use crate::remote::{DEFAULT_REMOTE_TIMEOUT, bounded};
use crate::shop::{
    domain::{
        ArticleId, CuttingJob, JobBoardQuery, JobDetail, JobDetailId, JobDetailLine, JobId,
        JobQuery, JobStatus, NewCuttingJob, NewJobDetail, PlannedQuantity, ShopDomainError,
        selection_matches,
    },
    ports::{ShopStore, ShopStoreError},
};
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Editable job fields of the administration table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEdit {
    /// Planned completion date.
    pub due_date: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: String,
    /// Requested status; checked against the lifecycle.
    pub status: JobStatus,
}

/// Job board service.
#[derive(Clone)]
pub struct JobBoardService<S, C>
where
    S: ShopStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    remote_timeout: Duration,
}

impl<S, C> JobBoardService<S, C>
where
    S: ShopStore,
    C: Clock + Send + Sync,
{
    /// Creates a new job board service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            store,
            clock,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Sets the deadline applied to store calls.
    #[must_use]
    pub const fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Lists jobs filtered and ordered for the administration table.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Store`] when the read fails.
    pub async fn list(&self, query: &JobBoardQuery) -> ShopServiceResult<Vec<CuttingJob>> {
        let mut jobs =
            bounded(self.remote_timeout, self.store.list_jobs(&JobQuery::default())).await?;
        query.apply(&mut jobs);
        Ok(jobs)
    }

    /// Lists jobs for the operator, newest first, matching `term` against
    /// the id or the notes.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Store`] when the read fails.
    pub async fn selection_list(&self, term: &str) -> ShopServiceResult<Vec<CuttingJob>> {
        let jobs = bounded(self.remote_timeout, self.store.list_jobs(&JobQuery::default())).await?;
        Ok(jobs
            .into_iter()
            .filter(|job| selection_matches(job, term))
            .collect())
    }

    /// Creates an empty `queued` job.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Store`] when the write fails.
    #[instrument(skip(self, notes))]
    pub async fn create(
        &self,
        due_date: Option<NaiveDate>,
        notes: impl Into<String> + Send,
    ) -> ShopServiceResult<CuttingJob> {
        let new_job = NewCuttingJob::new(due_date, notes, &*self.clock);
        let job = bounded(self.remote_timeout, self.store.insert_job(&new_job)).await?;
        info!(job_id = %job.id(), "job created");
        Ok(job)
    }

    /// Updates a job's date, notes and status.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Domain`] when the status change is not
    /// part of the lifecycle and [`ShopServiceError::Store`] when the job
    /// does not exist or the write fails.
    #[instrument(skip(self, edit))]
    pub async fn update(&self, id: JobId, edit: JobEdit) -> ShopServiceResult<CuttingJob> {
        let mut job = self.find(id).await?;
        job.transition_to(edit.status)?;
        job.edit_details(edit.due_date, edit.notes);
        bounded(self.remote_timeout, self.store.update_job(&job)).await?;
        Ok(job)
    }

    /// Deletes a job together with its details, programs and logs.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Store`] when the job does not exist or
    /// the write fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: JobId) -> ShopServiceResult<()> {
        bounded(self.remote_timeout, self.store.delete_job(id)).await?;
        info!(job_id = %id, "job deleted");
        Ok(())
    }

    /// Lists a job's details with their articles.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Store`] when the read fails.
    pub async fn details(&self, job_id: JobId) -> ShopServiceResult<Vec<JobDetailLine>> {
        let lines = bounded(self.remote_timeout, self.store.list_details(job_id)).await?;
        Ok(lines)
    }

    /// Adds an article to an existing job.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Domain`] for a quantity below one or an
    /// article already in the job, and [`ShopServiceError::Store`] when a
    /// read or the write fails.
    #[instrument(skip(self))]
    pub async fn add_detail(
        &self,
        job_id: JobId,
        article_id: ArticleId,
        pieces: i64,
    ) -> ShopServiceResult<JobDetail> {
        let quantity = PlannedQuantity::new(pieces)?;
        let lines = self.details(job_id).await?;
        if lines.iter().any(|line| line.detail.article_id == article_id) {
            return Err(ShopDomainError::DuplicateJobArticle(article_id).into());
        }
        let inserted = bounded(
            self.remote_timeout,
            self.store
                .insert_details(&[NewJobDetail::planned(job_id, article_id, quantity)]),
        )
        .await?;
        inserted
            .into_iter()
            .next()
            .ok_or_else(|| ShopServiceError::from(ShopStoreError::JobNotFound(job_id)))
    }

    /// Changes the planned quantity of a detail row.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Domain`] for a quantity below one and
    /// [`ShopServiceError::Store`] when the write fails.
    pub async fn set_planned_quantity(
        &self,
        id: JobDetailId,
        pieces: i64,
    ) -> ShopServiceResult<()> {
        let quantity = PlannedQuantity::new(pieces)?;
        bounded(
            self.remote_timeout,
            self.store.update_planned_quantity(id, quantity),
        )
        .await?;
        Ok(())
    }

    /// Removes a detail row.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Store`] when the write fails.
    pub async fn remove_detail(&self, id: JobDetailId) -> ShopServiceResult<()> {
        bounded(self.remote_timeout, self.store.delete_detail(id)).await?;
        Ok(())
    }

    async fn find(&self, id: JobId) -> ShopServiceResult<CuttingJob> {
        let job = bounded(self.remote_timeout, self.store.find_job(id))
            .await?
            .ok_or(ShopStoreError::JobNotFound(id))?;
        Ok(job)
    }
}
