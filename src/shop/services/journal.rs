//! Read-only job history.

use super::ShopServiceResult;
use crate::navigation::Route;
use crate::remote::{DEFAULT_REMOTE_TIMEOUT, bounded};
use crate::shop::{
    domain::{CuttingJob, CuttingLogEntry, CuttingProgram, JobDetailLine, JournalFilter},
    ports::ShopStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// A program with its log rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramHistory {
    /// The program.
    pub program: CuttingProgram,
    /// Its log rows.
    pub logs: Vec<CuttingLogEntry>,
}

/// One job of the history with everything recorded for it.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    /// The job.
    pub job: CuttingJob,
    /// Bill of materials with articles.
    pub lines: Vec<JobDetailLine>,
    /// Programs and logs.
    pub programs: Vec<ProgramHistory>,
    /// Whether the row is shown expanded.
    pub expanded: bool,
}

impl JournalEntry {
    /// Link showing only this job, expanded.
    #[must_use]
    pub fn job_link(&self) -> Route {
        Route::journal_for_job(self.job.id())
    }
}

/// A filtered history view.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalPage {
    /// Filter the page was loaded with.
    pub filter: JournalFilter,
    /// Matching jobs, newest first.
    pub entries: Vec<JournalEntry>,
}

impl JournalPage {
    /// Link to this view with `overrides` merged into the filter; empty
    /// values remove a filter.
    #[must_use]
    pub fn filter_link<'a>(&self, overrides: impl IntoIterator<Item = (&'a str, &'a str)>) -> Route {
        Route::Journal(self.filter.merged(overrides))
    }

    /// Link to this exact view.
    #[must_use]
    pub fn share_link(&self) -> Route {
        Route::Journal(self.filter.clone())
    }
}

/// Journal service.
#[derive(Clone)]
pub struct JournalService<S>
where
    S: ShopStore,
{
    store: Arc<S>,
    remote_timeout: Duration,
}

impl<S> JournalService<S>
where
    S: ShopStore,
{
    /// Creates a new journal service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self {
            store,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Sets the deadline applied to store calls.
    #[must_use]
    pub const fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Loads the history matching `filter`.
    ///
    /// Job-level filters go to the store; the article, program and operator
    /// filters are matched over each job's related rows.
    ///
    /// # Errors
    ///
    /// Returns [`super::ShopServiceError::Store`] when a read fails.
    #[instrument(skip(self), fields(query = %filter.to_query()))]
    pub async fn load(&self, filter: &JournalFilter) -> ShopServiceResult<JournalPage> {
        let jobs = bounded(self.remote_timeout, self.store.list_jobs(&filter.job_query())).await?;
        let mut entries = Vec::with_capacity(jobs.len());
        for job in jobs {
            let entry = self.entry(job, filter).await?;
            let logs: Vec<CuttingLogEntry> = entry
                .programs
                .iter()
                .flat_map(|history| history.logs.iter().cloned())
                .collect();
            let programs: Vec<CuttingProgram> = entry
                .programs
                .iter()
                .map(|history| history.program.clone())
                .collect();
            if filter.matches_related(&entry.lines, &programs, &logs) {
                entries.push(entry);
            }
        }
        debug!(entries = entries.len(), "journal loaded");
        Ok(JournalPage {
            filter: filter.clone(),
            entries,
        })
    }

    async fn entry(&self, job: CuttingJob, filter: &JournalFilter) -> ShopServiceResult<JournalEntry> {
        let job_id = job.id();
        let lines = bounded(self.remote_timeout, self.store.list_details(job_id)).await?;
        let program_rows =
            bounded(self.remote_timeout, self.store.list_programs(job_id)).await?;
        let mut programs = Vec::with_capacity(program_rows.len());
        for program in program_rows {
            let logs = bounded(self.remote_timeout, self.store.list_logs(program.id)).await?;
            programs.push(ProgramHistory { program, logs });
        }
        Ok(JournalEntry {
            job,
            lines,
            programs,
            expanded: filter.expanded == Some(job_id),
        })
    }
}
