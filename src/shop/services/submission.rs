//! Job creation: the job row, its bill of materials and the announcement.

use super::{ShopServiceError, ShopServiceResult};
use crate::notification::{
    domain::{NewNotification, templates::NEW_JOB},
    ports::NotificationRepository,
};
use crate::remote::{DEFAULT_REMOTE_TIMEOUT, bounded};
use crate::shop::{
    domain::{ArticleId, CuttingJob, JobDetail, JobDraft, NewJobDetail},
    ports::{ShopStore, ShopStoreError},
};
use minijinja::context;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// A stored job with its detail rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedJob {
    /// The new job, `queued`.
    pub job: CuttingJob,
    /// Detail rows with zero actual and rejected counts.
    pub details: Vec<JobDetail>,
}

/// Job submission service.
#[derive(Clone)]
pub struct JobSubmissionService<S, N, C>
where
    S: ShopStore,
    N: NotificationRepository,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    notifications: Arc<N>,
    clock: Arc<C>,
    remote_timeout: Duration,
}

impl<S, N, C> JobSubmissionService<S, N, C>
where
    S: ShopStore,
    N: NotificationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new submission service.
    #[must_use]
    pub const fn new(store: Arc<S>, notifications: Arc<N>, clock: Arc<C>) -> Self {
        Self {
            store,
            notifications,
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

    /// Looks up an article and adds it to the draft.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Domain`] for a quantity below one or an
    /// article already in the draft, and [`ShopServiceError::Store`] when
    /// the article does not exist or the lookup fails.
    pub async fn add_line(
        &self,
        draft: &mut JobDraft,
        article_id: ArticleId,
        pieces: i64,
    ) -> ShopServiceResult<()> {
        let article = bounded(self.remote_timeout, self.store.find_article(article_id))
            .await?
            .ok_or(ShopStoreError::ArticleNotFound(article_id))?;
        draft.add_line(article, pieces)?;
        Ok(())
    }

    /// Stores the job and its bill of materials.
    ///
    /// The job is inserted first. When the detail insert fails, the job row
    /// is deleted again on a best-effort basis and the detail error is
    /// returned. A `new_job` notification is sent afterwards; failing to
    /// send it does not fail the submission.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Domain`] for an empty draft and
    /// [`ShopServiceError::Store`] when a write fails.
    #[instrument(skip(self, draft), fields(lines = draft.lines().len()))]
    pub async fn submit(&self, draft: &JobDraft) -> ShopServiceResult<SubmittedJob> {
        let submission = draft.to_submission(&*self.clock)?;
        let job = bounded(self.remote_timeout, self.store.insert_job(&submission.job)).await?;

        let rows: Vec<NewJobDetail> = submission
            .lines
            .iter()
            .map(|(article_id, quantity)| NewJobDetail::planned(job.id(), *article_id, *quantity))
            .collect();
        let details = match bounded(self.remote_timeout, self.store.insert_details(&rows)).await {
            Ok(details) => details,
            Err(err) => {
                self.discard_job(&job).await;
                return Err(ShopServiceError::from(err));
            }
        };

        info!(job_id = %job.id(), "job submitted");
        self.announce(&job, details.len()).await;
        Ok(SubmittedJob { job, details })
    }

    async fn discard_job(&self, job: &CuttingJob) {
        if let Err(err) = bounded(self.remote_timeout, self.store.delete_job(job.id())).await {
            warn!(job_id = %job.id(), error = %err, "could not remove job after failed detail insert");
        }
    }

    async fn announce(&self, job: &CuttingJob, line_count: usize) {
        let due_date = job
            .due_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let rendered = NEW_JOB.render(context! {
            job_id => job.id().value(),
            due_date => due_date,
            line_count => line_count,
        });
        let notification = match rendered
            .and_then(|message| NewNotification::from_rendered(message, &*self.clock))
        {
            Ok(notification) => notification.with_job(job.id()),
            Err(err) => {
                warn!(job_id = %job.id(), error = %err, "new job notification not rendered");
                return;
            }
        };
        if let Err(err) = bounded(self.remote_timeout, self.notifications.insert(&notification)).await {
            warn!(job_id = %job.id(), error = %err, "new job notification not stored");
        }
    }
}
