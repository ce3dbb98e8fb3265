//! Orchestration services for the shop floor.

pub mod board;
pub mod catalog;
mod error;
pub mod execution;
pub mod journal;
pub mod submission;

pub use board::{JobBoardService, JobEdit};
pub use catalog::{
    ArticleCatalogService, ArticleSearchDebouncer, MIN_PICKER_TERM_CHARS, PICKER_DEBOUNCE,
    PICKER_LIMIT,
};
pub use error::{SaveStep, ShopServiceError, ShopServiceResult};
pub use execution::{
    COMPLETION_REDIRECT_DELAY, ExecutionSession, JobCompletion, JobExecutionService,
    SaveOutcome, ScheduledRedirect,
};
pub use journal::{JournalEntry, JournalPage, JournalService, ProgramHistory};
pub use submission::{JobSubmissionService, SubmittedJob};
