//! Navigational surface of the tracker.
//!
//! Routes are plain values: a router renders them with
//! [`Route::to_location`] and turns an address back into a route with
//! [`Route::parse`]. Journal filters travel in the query string, so a
//! filtered or expanded view can be shared as a link.

use crate::shop::domain::{JobId, JournalFilter};
use std::fmt;
use url::form_urlencoded;

/// A screen of the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Job creation form; also the fallback for unknown paths.
    CreateJob,
    /// Operator job selection, optionally with a job opened for execution.
    Operator(Option<JobId>),
    /// Filtered job history.
    Journal(JournalFilter),
    /// Article catalog management.
    Articles,
    /// Job administration table, optionally focused on one job.
    Jobs(Option<JobId>),
}

impl Route {
    /// Journal view showing one job, expanded.
    #[must_use]
    pub fn journal_for_job(job_id: JobId) -> Self {
        Self::Journal(JournalFilter::for_job(job_id))
    }

    /// Renders the route as a path with its query string.
    #[must_use]
    pub fn to_location(&self) -> String {
        match self {
            Self::CreateJob => "/create".to_owned(),
            Self::Operator(None) => "/operator".to_owned(),
            Self::Operator(Some(job_id)) => format!("/operator?job_id={job_id}"),
            Self::Journal(filter) => {
                let query = filter.to_query();
                if query.is_empty() {
                    "/view/information".to_owned()
                } else {
                    format!("/view/information?{query}")
                }
            }
            Self::Articles => "/view/articles".to_owned(),
            Self::Jobs(None) => "/view/jobs".to_owned(),
            Self::Jobs(Some(job_id)) => format!("/view/jobs?id={job_id}"),
        }
    }

    /// Resolves a location. Unknown paths fall back to the creation form.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim().trim_start_matches('#');
        let (path, query) = trimmed.split_once('?').unwrap_or((trimmed, ""));
        match path.trim_end_matches('/') {
            "/operator" => Self::Operator(query_id(query, "job_id")),
            "/view/information" => Self::Journal(JournalFilter::from_query(query)),
            "/view/articles" => Self::Articles,
            "/view/jobs" => Self::Jobs(query_id(query, "id")),
            _ => Self::CreateJob,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_location())
    }
}

fn query_id(query: &str, wanted: &str) -> Option<JobId> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == wanted)
        .and_then(|(_, value)| value.parse().ok())
}
