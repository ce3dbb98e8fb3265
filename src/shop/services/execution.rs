//! Operator execution of a cutting job.
//!
//! A save is validated by [`ExecutionDraft::validate_save`] and then written
//! in a fixed order: cutting log, detail counts, job status. Later steps
//! never undo earlier ones; a failure after the log write is reported as
//! [`ShopServiceError::PartialSave`].

use super::{SaveStep, ShopServiceError, ShopServiceResult};
use crate::navigation::Route;
use crate::notification::{
    domain::{NewNotification, Notification, templates::JOB_COMPLETED},
    ports::NotificationRepository,
};
use crate::remote::{DEFAULT_REMOTE_TIMEOUT, bounded};
use crate::shop::{
    domain::{
        CuttingJob, CuttingLogEntry, CuttingProgram, ExecutionChange, ExecutionDraft,
        GasConsumption, JobDetailLine, JobId, JobStatus, LogWrite, NewCuttingProgram,
        ProgramFileName, ShopDomainError, ValidatedSave,
    },
    ports::{ShopStore, ShopStoreError},
};
use minijinja::context;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Pause before leaving the screen after completion, so the operator sees
/// the confirmation.
pub const COMPLETION_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Everything the operator screen shows for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSession {
    job: CuttingJob,
    program: Option<CuttingProgram>,
    log: Option<CuttingLogEntry>,
    lines: Vec<JobDetailLine>,
    draft: ExecutionDraft,
}

impl ExecutionSession {
    fn new(
        job: CuttingJob,
        program: Option<CuttingProgram>,
        log: Option<CuttingLogEntry>,
        lines: Vec<JobDetailLine>,
    ) -> Self {
        let draft = ExecutionDraft::load(&job, program.as_ref(), log.as_ref(), &lines);
        Self {
            job,
            program,
            log,
            lines,
            draft,
        }
    }

    /// Returns the job as last stored.
    #[must_use]
    pub const fn job(&self) -> &CuttingJob {
        &self.job
    }

    /// Returns the job's program, if named.
    #[must_use]
    pub const fn program(&self) -> Option<&CuttingProgram> {
        self.program.as_ref()
    }

    /// Returns the program's log, if started.
    #[must_use]
    pub const fn log(&self) -> Option<&CuttingLogEntry> {
        self.log.as_ref()
    }

    /// Returns the detail lines with their articles.
    #[must_use]
    pub fn lines(&self) -> &[JobDetailLine] {
        &self.lines
    }

    /// Returns the form state.
    #[must_use]
    pub const fn draft(&self) -> &ExecutionDraft {
        &self.draft
    }

    /// Applies one form edit.
    pub fn apply(&mut self, change: ExecutionChange) {
        self.draft.apply(change);
    }

    /// Gas consumption derived from the current inputs.
    #[must_use]
    pub fn gas_consumption(&self) -> GasConsumption {
        self.draft.log.gas_consumption()
    }

    /// Preparation plus cutting minutes from the current inputs.
    #[must_use]
    pub fn total_minutes(&self) -> u32 {
        self.draft.log.total_minutes()
    }
}

/// Navigation scheduled after a job completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRedirect {
    /// Delay before navigating.
    pub delay: Duration,
    /// Destination.
    pub route: Route,
}

impl ScheduledRedirect {
    /// Sleeps for the delay and returns the destination.
    pub async fn wait(self) -> Route {
        tokio::time::sleep(self.delay).await;
        self.route
    }
}

/// Completion follow-ups of a save that moved the job to `done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCompletion {
    /// Stored `job_completed` notification; `None` when sending failed.
    pub notification: Option<Notification>,
    /// Journal view of the finished job.
    pub redirect: ScheduledRedirect,
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The log as stored.
    pub log: CuttingLogEntry,
    /// Status the job moved to, if it changed.
    pub status_change: Option<JobStatus>,
    /// Present when the save completed the job.
    pub completion: Option<JobCompletion>,
}

/// Job execution service.
#[derive(Clone)]
pub struct JobExecutionService<S, N, C>
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

impl<S, N, C> JobExecutionService<S, N, C>
where
    S: ShopStore,
    N: NotificationRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new execution service.
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

    /// Loads a job with its program, latest log and detail lines.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Store`] when the job does not exist or a
    /// read fails.
    #[instrument(skip(self))]
    pub async fn open(&self, job_id: JobId) -> ShopServiceResult<ExecutionSession> {
        let job = bounded(self.remote_timeout, self.store.find_job(job_id))
            .await?
            .ok_or(ShopStoreError::JobNotFound(job_id))?;
        let program =
            bounded(self.remote_timeout, self.store.find_program_for_job(job_id)).await?;
        let log = match &program {
            Some(existing) => {
                bounded(self.remote_timeout, self.store.latest_log(existing.id)).await?
            }
            None => None,
        };
        let lines = bounded(self.remote_timeout, self.store.list_details(job_id)).await?;
        Ok(ExecutionSession::new(job, program, log, lines))
    }

    /// Names the job's cutting program using the draft's program name.
    ///
    /// A `queued` job moves to `in_progress` once its program exists.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Domain`] for an empty name or when the
    /// job already has a program, and [`ShopServiceError::Store`] when a
    /// write fails.
    #[instrument(skip(self, session), fields(job_id = %session.job.id()))]
    pub async fn create_program(
        &self,
        session: &mut ExecutionSession,
    ) -> ShopServiceResult<CuttingProgram> {
        let job_id = session.job.id();
        if session.program.is_some() {
            return Err(ShopDomainError::ProgramAlreadyExists(job_id).into());
        }
        let file_name = ProgramFileName::new(session.draft.program_name.clone())?;
        let program = bounded(
            self.remote_timeout,
            self.store
                .insert_program(&NewCuttingProgram { job_id, file_name }),
        )
        .await?;
        session.program = Some(program.clone());

        if session.job.status() == JobStatus::Queued {
            bounded(
                self.remote_timeout,
                self.store
                    .update_job_status(job_id, JobStatus::InProgress),
            )
            .await?;
            session.job.transition_to(JobStatus::InProgress)?;
            session.draft.status = JobStatus::InProgress;
            info!(%job_id, "job started");
        }
        Ok(program)
    }

    /// Renames the job's program to the draft's program name.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Domain`] when no program exists or the
    /// name is empty, and [`ShopServiceError::Store`] when the write fails.
    pub async fn rename_program(
        &self,
        session: &mut ExecutionSession,
    ) -> ShopServiceResult<CuttingProgram> {
        let program_id = session
            .program
            .as_ref()
            .map(|program| program.id)
            .ok_or(ShopDomainError::NoProgram)?;
        let file_name = ProgramFileName::new(session.draft.program_name.clone())?;
        let renamed = bounded(
            self.remote_timeout,
            self.store.rename_program(program_id, &file_name),
        )
        .await?;
        session.program = Some(renamed.clone());
        Ok(renamed)
    }

    /// Validates and stores the operator's inputs.
    ///
    /// # Errors
    ///
    /// Returns [`ShopServiceError::Domain`] when validation fails (nothing
    /// is written), [`ShopServiceError::Store`] when the log write fails and
    /// [`ShopServiceError::PartialSave`] when a later step fails.
    #[instrument(skip(self, session), fields(job_id = %session.job.id()))]
    pub async fn save(&self, session: &mut ExecutionSession) -> ShopServiceResult<SaveOutcome> {
        let validated = session.draft.validate_save(
            &session.job,
            session.program.as_ref().map(|program| program.id),
            session.log.as_ref().map(|log| log.id),
        )?;

        let log = self.write_log(&validated).await?;
        session.log = Some(log.clone());

        for (detail_id, counts) in &validated.details {
            bounded(
                self.remote_timeout,
                self.store.update_detail_counts(*detail_id, *counts),
            )
            .await
            .map_err(|source| ShopServiceError::PartialSave {
                completed: SaveStep::Log,
                source,
            })?;
            if let Some(line) = session
                .lines
                .iter_mut()
                .find(|line| line.detail.id == *detail_id)
            {
                line.detail.counts = *counts;
            }
        }

        if let Some(status) = validated.status_change {
            bounded(
                self.remote_timeout,
                self.store.update_job_status(session.job.id(), status),
            )
            .await
            .map_err(|source| ShopServiceError::PartialSave {
                completed: SaveStep::Details,
                source,
            })?;
            session.job.transition_to(status)?;
            info!(job_id = %session.job.id(), status = %status, "job status changed");
        }

        let completion = if validated.completes_job() {
            Some(self.complete(session).await)
        } else {
            None
        };
        Ok(SaveOutcome {
            log,
            status_change: validated.status_change,
            completion,
        })
    }

    async fn write_log(&self, validated: &ValidatedSave) -> ShopServiceResult<CuttingLogEntry> {
        let write = LogWrite::plan(
            validated.program_id,
            validated.existing_log,
            validated.fields.clone(),
            &*self.clock,
        );
        let stored = match write {
            LogWrite::Insert(entry) => {
                debug!(program_id = %entry.program_id, "starting cutting log");
                bounded(self.remote_timeout, self.store.insert_log(&entry)).await?
            }
            LogWrite::Update(update) => {
                debug!(log_id = %update.id, "updating cutting log");
                bounded(self.remote_timeout, self.store.update_log(&update)).await?
            }
        };
        Ok(stored)
    }

    async fn complete(&self, session: &ExecutionSession) -> JobCompletion {
        let job_id = session.job.id();
        let notification = self.announce_completion(session).await;
        JobCompletion {
            notification,
            redirect: ScheduledRedirect {
                delay: COMPLETION_REDIRECT_DELAY,
                route: Route::journal_for_job(job_id),
            },
        }
    }

    async fn announce_completion(&self, session: &ExecutionSession) -> Option<Notification> {
        let job_id = session.job.id();
        let rendered = JOB_COMPLETED.render(context! {
            job_id => job_id.value(),
            operator => session.draft.log.operator_name.trim(),
            total_minutes => session.total_minutes(),
        });
        let notification = match rendered
            .and_then(|message| NewNotification::from_rendered(message, &*self.clock))
        {
            Ok(notification) => notification.with_job(job_id),
            Err(err) => {
                warn!(%job_id, error = %err, "completion notification not rendered");
                return None;
            }
        };
        match bounded(self.remote_timeout, self.notifications.insert(&notification)).await {
            Ok(stored) => Some(stored),
            Err(err) => {
                warn!(%job_id, error = %err, "completion notification not stored");
                None
            }
        }
    }
}
