//! Domain model for the shop floor: jobs, articles, bills of materials,
//! cutting programs and operator logs.

mod article;
mod board;
mod detail;
mod error;
mod execution;
mod gas;
mod ids;
mod job;
mod journal;
mod log_entry;
mod log_form;
mod program;
mod submission;

pub use article::{
    Article, ArticleDraft, ArticleNumber, ArticleQuery, ArticleSearchField, ArticleSort,
    ArticleSortField, SortDirection,
};
pub use board::{JobBoardQuery, JobSortField, selection_matches};
pub use detail::{DetailCounts, JobDetail, JobDetailLine, NewJobDetail, PlannedQuantity};
pub use error::{ParseJobStatusError, ShopDomainError};
pub use execution::{DetailDraft, ExecutionChange, ExecutionDraft, ValidatedSave};
pub use gas::{GasConsumption, GasSelection};
pub use ids::{ArticleId, JobDetailId, JobId, LogEntryId, ProgramId};
pub use job::{CuttingJob, JobStatus, NewCuttingJob, PersistedJobData};
pub use journal::{JobQuery, JournalFilter};
pub use log_entry::{
    CuttingLogEntry, LogFields, LogUpdate, LogWrite, NewCuttingLogEntry, parse_date,
    parse_decimal, parse_minutes,
};
pub use log_form::{LogForm, LogFormChange};
pub use program::{CuttingProgram, NewCuttingProgram, ProgramFileName};
pub use submission::{DraftLine, JobDraft, JobSubmission};
