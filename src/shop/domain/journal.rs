//! Job history filters and their query-string form.
//!
//! Job-level filters become a [`JobQuery`] evaluated by the store; the rest
//! are matched here over a job's details, programs and logs.

use super::{CuttingJob, CuttingLogEntry, CuttingProgram, JobDetailLine, JobId, JobStatus};
use chrono::{DateTime, Days, NaiveDate, Utc};
use url::form_urlencoded;

/// Store-side job filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobQuery {
    /// Exact job key.
    pub job_id: Option<JobId>,
    /// Exact status.
    pub status: Option<JobStatus>,
    /// Inclusive lower bound on `creation_date`.
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `creation_date`.
    pub created_before: Option<DateTime<Utc>>,
}

impl JobQuery {
    /// Returns whether `job` satisfies every set bound.
    #[must_use]
    pub fn matches(&self, job: &CuttingJob) -> bool {
        self.job_id.is_none_or(|id| job.id() == id)
            && self.status.is_none_or(|status| job.status() == status)
            && self
                .created_from
                .is_none_or(|from| job.creation_date() >= from)
            && self
                .created_before
                .is_none_or(|before| job.creation_date() < before)
    }
}

/// Filter state of the job journal and job table views.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JournalFilter {
    /// Exact job key.
    pub job_id: Option<JobId>,
    /// Exact status.
    pub status: Option<JobStatus>,
    /// Substring of an article name in the job.
    pub article_name: String,
    /// Substring of an article material in the job.
    pub material_type: String,
    /// Substring of an article thickness rendered as decimal text.
    pub thickness: String,
    /// Substring of a program file name.
    pub file_name: String,
    /// Substring of a log operator name.
    pub operator_name: String,
    /// First creation day, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Last creation day, inclusive.
    pub date_to: Option<NaiveDate>,
    /// Job whose row is shown expanded.
    pub expanded: Option<JobId>,
}

const KEYS: [&str; 10] = [
    "job_id",
    "status",
    "article_name",
    "material_type",
    "thickness",
    "file_name",
    "operator_name",
    "date_from",
    "date_to",
    "expanded",
];

impl JournalFilter {
    /// Filter showing a single job, expanded.
    #[must_use]
    pub fn for_job(job_id: JobId) -> Self {
        Self {
            job_id: Some(job_id),
            expanded: Some(job_id),
            ..Self::default()
        }
    }

    /// Parses a query string, with or without the leading `?`.
    ///
    /// Unknown keys are ignored and malformed values leave the filter unset.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut filter = Self::default();
        let pairs = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in form_urlencoded::parse(pairs.as_bytes()) {
            filter.set(&key, &value);
        }
        filter
    }

    /// Renders the non-empty filters as a query string without `?`.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    /// Returns this filter with `overrides` applied; empty values clear the
    /// corresponding key.
    #[must_use]
    pub fn merged<'a>(&self, overrides: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut merged = self.clone();
        for (key, value) in overrides {
            merged.set(key, value);
        }
        merged
    }

    /// Derives the store-side part of the filter.
    #[must_use]
    pub fn job_query(&self) -> JobQuery {
        JobQuery {
            job_id: self.job_id,
            status: self.status,
            created_from: self.date_from.map(start_of_day),
            created_before: self
                .date_to
                .and_then(|day| day.checked_add_days(Days::new(1)))
                .map(start_of_day),
        }
    }

    /// Returns whether any filter needs the job's related rows.
    #[must_use]
    pub fn has_related_filters(&self) -> bool {
        [
            &self.article_name,
            &self.material_type,
            &self.thickness,
            &self.file_name,
            &self.operator_name,
        ]
        .into_iter()
        .any(|value| !value.trim().is_empty())
    }

    /// Matches the related-row filters; blank filters always match.
    #[must_use]
    pub fn matches_related(
        &self,
        lines: &[JobDetailLine],
        programs: &[CuttingProgram],
        logs: &[CuttingLogEntry],
    ) -> bool {
        let articles = || lines.iter().filter_map(|line| line.article.as_ref());
        contains_any(&self.article_name, articles().map(|article| article.name().to_owned()))
            && contains_any(
                &self.material_type,
                articles().map(|article| article.material_type().to_owned()),
            )
            && contains_any(
                &self.thickness,
                articles().map(|article| article.thickness().to_string()),
            )
            && contains_any(
                &self.file_name,
                programs
                    .iter()
                    .map(|program| program.file_name.as_str().to_owned()),
            )
            && contains_any(
                &self.operator_name,
                logs.iter().map(|log| log.fields.operator_name.clone()),
            )
    }

    fn set(&mut self, key: &str, raw: &str) {
        let value = raw.trim();
        match key {
            "job_id" => self.job_id = value.parse().ok(),
            "status" => self.status = JobStatus::try_from(value).ok(),
            "article_name" => value.clone_into(&mut self.article_name),
            "material_type" => value.clone_into(&mut self.material_type),
            "thickness" => value.clone_into(&mut self.thickness),
            "file_name" => value.clone_into(&mut self.file_name),
            "operator_name" => value.clone_into(&mut self.operator_name),
            "date_from" => self.date_from = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
            "date_to" => self.date_to = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
            "expanded" => self.expanded = value.parse().ok(),
            _ => {}
        }
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        let values = [
            self.job_id.map(|id| id.to_string()),
            self.status.map(|status| status.as_str().to_owned()),
            Some(self.article_name.clone()),
            Some(self.material_type.clone()),
            Some(self.thickness.clone()),
            Some(self.file_name.clone()),
            Some(self.operator_name.clone()),
            self.date_from.map(|day| day.format("%Y-%m-%d").to_string()),
            self.date_to.map(|day| day.format("%Y-%m-%d").to_string()),
            self.expanded.map(|id| id.to_string()),
        ];
        KEYS.into_iter()
            .zip(values)
            .filter_map(|(key, value)| value.filter(|text| !text.is_empty()).map(|text| (key, text)))
            .collect()
    }
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn contains_any(filter: &str, haystacks: impl Iterator<Item = String>) -> bool {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystacks
        .map(|text| text.to_lowercase())
        .any(|text| text.contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shop::domain::{
        Article, ArticleDraft, ArticleId, DetailCounts, JobDetail, JobDetailId, PlannedQuantity,
        ProgramFileName, ProgramId,
    };
    use rstest::rstest;

    fn line(name: &str, thickness: f64) -> JobDetailLine {
        let fields = ArticleDraft::new("A-1", name, thickness, "S235", None).expect("article");
        JobDetailLine {
            detail: JobDetail {
                id: JobDetailId::new(1),
                job_id: JobId::new(1),
                article_id: ArticleId::new(1),
                quantity_planned: PlannedQuantity::new(1).expect("quantity"),
                counts: DetailCounts::ZERO,
            },
            article: Some(Article::from_persisted(ArticleId::new(1), fields)),
        }
    }

    #[test]
    fn query_string_round_trips() {
        let filter = JournalFilter {
            status: Some(JobStatus::InProgress),
            operator_name: "Іван Петренко".to_owned(),
            date_to: NaiveDate::from_ymd_opt(2025, 3, 31),
            ..JournalFilter::for_job(JobId::new(12))
        };
        let query = filter.to_query();
        assert_eq!(JournalFilter::from_query(&query), filter);
        assert!(query.starts_with("job_id=12&status=in_progress"));
    }

    #[test]
    fn malformed_values_are_ignored() {
        let filter = JournalFilter::from_query("?job_id=abc&status=unknown&thickness=2.5&x=1");
        assert_eq!(filter.job_id, None);
        assert_eq!(filter.status, None);
        assert_eq!(filter.thickness, "2.5");
    }

    #[test]
    fn merge_removes_emptied_keys() {
        let filter = JournalFilter::for_job(JobId::new(3))
            .merged([("expanded", ""), ("file_name", "sheet")]);
        assert_eq!(filter.to_query(), "job_id=3&file_name=sheet");
    }

    #[test]
    fn date_to_covers_the_whole_day() {
        let filter = JournalFilter::from_query("date_to=2025-01-01");
        let query = filter.job_query();
        let expected = NaiveDate::from_ymd_opt(2025, 1, 2).map(start_of_day);
        assert_eq!(query.created_before, expected);
    }

    #[rstest]
    #[case("plate", "", true)]
    #[case("PLATE", "2.5", true)]
    #[case("bracket", "", false)]
    #[case("", "3", false)]
    fn related_filters_match_case_insensitively(
        #[case] article_name: &str,
        #[case] thickness: &str,
        #[case] expected: bool,
    ) {
        let filter = JournalFilter::from_query(&format!(
            "article_name={article_name}&thickness={thickness}"
        ));
        let programs = [CuttingProgram {
            id: ProgramId::new(1),
            job_id: JobId::new(1),
            file_name: ProgramFileName::new("sheet1.nc").expect("file name"),
        }];
        assert_eq!(
            filter.matches_related(&[line("Base plate", 2.5)], &programs, &[]),
            expected
        );
    }
}
