//! Diesel row models for the shop-floor tables.

use super::schema::{articles, cutting_jobs, cutting_log, cutting_programs, job_details};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

/// Query result row for `cutting_jobs`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cutting_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRow {
    /// Serial job key.
    pub job_id: i64,
    /// Lifecycle status.
    pub status: String,
    /// Planned completion date.
    pub due_date: Option<NaiveDate>,
    /// Notes.
    pub notes: String,
    /// Submission timestamp.
    pub creation_date: DateTime<Utc>,
}

/// Insert model for `cutting_jobs`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cutting_jobs)]
pub struct NewJobRow {
    /// Lifecycle status.
    pub status: String,
    /// Planned completion date.
    pub due_date: Option<NaiveDate>,
    /// Notes.
    pub notes: String,
    /// Submission timestamp.
    pub creation_date: DateTime<Utc>,
}

/// Query result row for `articles`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = articles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArticleRow {
    /// Serial article key.
    pub article_id: i64,
    /// Catalog number.
    pub article_num: String,
    /// Display name.
    pub name: String,
    /// Thickness in millimetres.
    pub thickness: f64,
    /// Material designation.
    pub material_type: String,
    /// Drawing location.
    pub file_url: Option<String>,
}

/// Insert and update model for `articles`.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = articles)]
#[diesel(treat_none_as_null = true)]
pub struct ArticleChangeset {
    /// Catalog number.
    pub article_num: String,
    /// Display name.
    pub name: String,
    /// Thickness in millimetres.
    pub thickness: f64,
    /// Material designation.
    pub material_type: String,
    /// Drawing location.
    pub file_url: Option<String>,
}

/// Query result row for `job_details`.
#[derive(Debug, Clone, Copy, Queryable, Selectable)]
#[diesel(table_name = job_details)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DetailRow {
    /// Serial detail key.
    pub job_detail_id: i64,
    /// Owning job.
    pub job_id: i64,
    /// Planned article.
    pub article_id: i64,
    /// Planned pieces.
    pub quantity_planned: i32,
    /// Pieces actually cut.
    pub quantity_actual: Option<i32>,
    /// Rejected pieces.
    pub rejection_count: Option<i32>,
}

/// Insert model for `job_details`.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = job_details)]
pub struct NewDetailRow {
    /// Owning job.
    pub job_id: i64,
    /// Planned article.
    pub article_id: i64,
    /// Planned pieces.
    pub quantity_planned: i32,
    /// Pieces actually cut.
    pub quantity_actual: Option<i32>,
    /// Rejected pieces.
    pub rejection_count: Option<i32>,
}

/// Query result row for `cutting_programs`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cutting_programs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProgramRow {
    /// Serial program key.
    pub program_id: i64,
    /// Owning job.
    pub job_id: i64,
    /// Program file name.
    pub file_name: String,
}

/// Insert model for `cutting_programs`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cutting_programs)]
pub struct NewProgramRow {
    /// Owning job.
    pub job_id: i64,
    /// Program file name.
    pub file_name: String,
}

/// Query result row for `cutting_log`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cutting_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LogRow {
    /// Serial log key.
    pub log_entry_id: i64,
    /// Program the log belongs to.
    pub program_id: i64,
    /// Operator name.
    pub operator_name: String,
    /// Day of the cut.
    pub cut_date: Option<NaiveDate>,
    /// Start meter.
    pub start_meter: Option<f64>,
    /// End meter.
    pub end_meter: Option<f64>,
    /// Oxygen pressure.
    pub oxygen_pressure: Option<f64>,
    /// Air flag, 0 or 1.
    pub air_pressure: i16,
    /// Preparation minutes.
    pub preparation_time_minutes: Option<i32>,
    /// Cutting minutes.
    pub cutting_time_minutes: Option<i32>,
    /// First save.
    pub start_time: Option<DateTime<Utc>>,
    /// Latest update.
    pub end_time: Option<DateTime<Utc>>,
}

/// Log values written by both inserts and updates.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = cutting_log)]
#[diesel(treat_none_as_null = true)]
pub struct LogValues {
    /// Operator name.
    pub operator_name: String,
    /// Day of the cut.
    pub cut_date: Option<NaiveDate>,
    /// Start meter.
    pub start_meter: Option<f64>,
    /// End meter.
    pub end_meter: Option<f64>,
    /// Oxygen pressure.
    pub oxygen_pressure: Option<f64>,
    /// Air flag, 0 or 1.
    pub air_pressure: i16,
    /// Preparation minutes.
    pub preparation_time_minutes: Option<i32>,
    /// Cutting minutes.
    pub cutting_time_minutes: Option<i32>,
}

/// Insert model for `cutting_log`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cutting_log)]
pub struct NewLogRow {
    /// Program the log belongs to.
    pub program_id: i64,
    /// Logged values.
    #[diesel(embed)]
    pub values: LogValues,
    /// First save.
    pub start_time: Option<DateTime<Utc>>,
}
