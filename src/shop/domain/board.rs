//! Search and ordering rules of the job tables.

use super::{CuttingJob, SortDirection};
use std::cmp::Ordering;

/// Column the job table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSortField {
    /// Store key.
    #[default]
    Id,
    /// Lifecycle status.
    Status,
    /// Planned completion date; jobs without one sort first.
    DueDate,
    /// Free-form notes.
    Notes,
    /// Creation timestamp.
    CreationDate,
}

impl JobSortField {
    /// Compares two jobs on this column in ascending order.
    #[must_use]
    pub fn compare(self, left: &CuttingJob, right: &CuttingJob) -> Ordering {
        match self {
            Self::Id => left.id().cmp(&right.id()),
            Self::Status => left.status().label().cmp(right.status().label()),
            Self::DueDate => left.due_date().cmp(&right.due_date()),
            Self::Notes => left.notes().cmp(right.notes()),
            Self::CreationDate => left.creation_date().cmp(&right.creation_date()),
        }
    }
}

/// Free-text search and ordering of the job administration table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobBoardQuery {
    /// Matched against the id, the notes and the status label.
    pub search: String,
    /// Sorted column.
    pub sort: JobSortField,
    /// Sort direction.
    pub direction: SortDirection,
}

impl Default for JobBoardQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: JobSortField::Id,
            direction: SortDirection::Descending,
        }
    }
}

impl JobBoardQuery {
    /// Returns whether `job` matches the search term; blank terms match.
    #[must_use]
    pub fn matches(&self, job: &CuttingJob) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || job.id().to_string().contains(&needle)
            || job.notes().to_lowercase().contains(&needle)
            || job.status().label().to_lowercase().contains(&needle)
            || job.status().as_str().contains(&needle)
    }

    /// Filters and orders `jobs` in place.
    pub fn apply(&self, jobs: &mut Vec<CuttingJob>) {
        jobs.retain(|job| self.matches(job));
        jobs.sort_by(|left, right| self.direction.apply(self.sort.compare(left, right)));
    }
}

/// Returns whether an operator selection term matches the job's id or
/// notes, ignoring case; blank terms match.
#[must_use]
pub fn selection_matches(job: &CuttingJob, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    needle.is_empty()
        || job.id().to_string().contains(&needle)
        || job.notes().to_lowercase().contains(&needle)
}
