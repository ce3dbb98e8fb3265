//! Shared world state for job execution BDD scenarios.

use std::sync::Arc;

use lasertrack::notification::adapters::memory::InMemoryNotificationStore;
use lasertrack::shop::{
    adapters::memory::InMemoryShopStore,
    domain::JobId,
    services::{ExecutionSession, JobExecutionService, SaveOutcome, ShopServiceError},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Execution service type used by the BDD world.
pub type TestExecutionService =
    JobExecutionService<InMemoryShopStore, InMemoryNotificationStore, DefaultClock>;

/// Scenario world for job execution behaviour tests.
pub struct JobExecutionWorld {
    pub store: Arc<InMemoryShopStore>,
    pub notifications: Arc<InMemoryNotificationStore>,
    pub execution: TestExecutionService,
    pub job_id: Option<JobId>,
    pub session: Option<ExecutionSession>,
    pub last_save: Option<Result<SaveOutcome, ShopServiceError>>,
}

impl JobExecutionWorld {
    /// Creates a world with empty stores.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryShopStore::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());
        let execution = JobExecutionService::new(
            Arc::clone(&store),
            Arc::clone(&notifications),
            Arc::new(DefaultClock),
        );
        Self {
            store,
            notifications,
            execution,
            job_id: None,
            session: None,
            last_save: None,
        }
    }

    /// Returns the open operator session.
    pub fn session_mut(&mut self) -> Result<&mut ExecutionSession, eyre::Report> {
        self.session
            .as_mut()
            .ok_or_else(|| eyre::eyre!("no operator session in scenario world"))
    }

    /// Returns the last successful save.
    pub fn last_outcome(&self) -> Result<&SaveOutcome, eyre::Report> {
        match self.last_save.as_ref() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(err)) => Err(eyre::eyre!("last save failed: {err}")),
            None => Err(eyre::eyre!("nothing saved yet")),
        }
    }
}

impl Default for JobExecutionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> JobExecutionWorld {
    JobExecutionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
