//! `PostgreSQL` implementation of the shop repositories.

use super::{
    models::{
        ArticleChangeset, ArticleRow, DetailRow, JobRow, LogRow, LogValues, NewDetailRow,
        NewJobRow, NewLogRow, NewProgramRow, ProgramRow,
    },
    schema::{articles, cutting_jobs, cutting_log, cutting_programs, job_details},
};
use crate::shop::{
    domain::{
        Article, ArticleDraft, ArticleId, ArticleNumber, ArticleQuery, ArticleSearchField,
        ArticleSortField, CuttingJob, CuttingLogEntry, CuttingProgram, DetailCounts, JobDetail,
        JobDetailId, JobDetailLine, JobId, JobQuery, JobStatus, LogEntryId, LogFields, LogUpdate,
        NewCuttingJob, NewCuttingLogEntry, NewCuttingProgram, NewJobDetail, PersistedJobData,
        PlannedQuantity, ProgramFileName, ProgramId, SortDirection,
    },
    ports::{
        ArticleRepository, CuttingLogRepository, JobDetailRepository, JobRepository,
        ProgramRepository, ShopStoreError, ShopStoreResult,
    },
};
use async_trait::async_trait;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use std::time::Duration;

/// `PostgreSQL` connection pool type shared by the store adapters.
pub type ShopPgPool = Pool<ConnectionManager<PgConnection>>;

const ARTICLE_NUMBER_UNIQUE: &str = "articles_article_num_key";
const JOB_ARTICLE_UNIQUE: &str = "job_details_job_id_article_id_key";
const PROGRAM_PER_JOB_UNIQUE: &str = "cutting_programs_job_id_key";

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`ShopStoreError::Persistence`] when the pool cannot open its
/// first connection within `connect_timeout`.
pub fn build_pool(database_url: &str, connect_timeout: Duration) -> ShopStoreResult<ShopPgPool> {
    Pool::builder()
        .connection_timeout(connect_timeout)
        .build(ConnectionManager::<PgConnection>::new(database_url))
        .map_err(ShopStoreError::persistence)
}

/// `PostgreSQL`-backed shop store.
#[derive(Debug, Clone)]
pub struct PostgresShopStore {
    pool: ShopPgPool,
}

impl PostgresShopStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: ShopPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ShopStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ShopStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ShopStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ShopStoreError::persistence)?
    }
}

#[async_trait]
impl JobRepository for PostgresShopStore {
    async fn insert_job(&self, job: &NewCuttingJob) -> ShopStoreResult<CuttingJob> {
        let row = NewJobRow {
            status: job.status.as_str().to_owned(),
            due_date: job.due_date,
            notes: job.notes.clone(),
            creation_date: job.creation_date,
        };
        self.run_blocking(move |connection| {
            let stored = diesel::insert_into(cutting_jobs::table)
                .values(&row)
                .returning(JobRow::as_returning())
                .get_result(connection)
                .map_err(ShopStoreError::persistence)?;
            row_to_job(stored)
        })
        .await
    }

    async fn find_job(&self, id: JobId) -> ShopStoreResult<Option<CuttingJob>> {
        self.run_blocking(move |connection| {
            cutting_jobs::table
                .find(id.value())
                .select(JobRow::as_select())
                .first(connection)
                .optional()
                .map_err(ShopStoreError::persistence)?
                .map(row_to_job)
                .transpose()
        })
        .await
    }

    async fn list_jobs(&self, query: &JobQuery) -> ShopStoreResult<Vec<CuttingJob>> {
        let filter = *query;
        self.run_blocking(move |connection| {
            let mut statement = cutting_jobs::table
                .select(JobRow::as_select())
                .order(cutting_jobs::job_id.desc())
                .into_boxed::<Pg>();
            if let Some(id) = filter.job_id {
                statement = statement.filter(cutting_jobs::job_id.eq(id.value()));
            }
            if let Some(status) = filter.status {
                statement = statement.filter(cutting_jobs::status.eq(status.as_str()));
            }
            if let Some(from) = filter.created_from {
                statement = statement.filter(cutting_jobs::creation_date.ge(from));
            }
            if let Some(before) = filter.created_before {
                statement = statement.filter(cutting_jobs::creation_date.lt(before));
            }
            statement
                .load(connection)
                .map_err(ShopStoreError::persistence)?
                .into_iter()
                .map(row_to_job)
                .collect()
        })
        .await
    }

    async fn update_job(&self, job: &CuttingJob) -> ShopStoreResult<()> {
        let id = job.id();
        let status = job.status().as_str();
        let due_date = job.due_date();
        let notes = job.notes().to_owned();
        self.run_blocking(move |connection| {
            let updated = diesel::update(cutting_jobs::table.find(id.value()))
                .set((
                    cutting_jobs::status.eq(status),
                    cutting_jobs::due_date.eq(due_date),
                    cutting_jobs::notes.eq(notes),
                ))
                .execute(connection)
                .map_err(ShopStoreError::persistence)?;
            ensure_found(updated, ShopStoreError::JobNotFound(id))
        })
        .await
    }

    async fn update_job_status(&self, id: JobId, status: JobStatus) -> ShopStoreResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(cutting_jobs::table.find(id.value()))
                .set(cutting_jobs::status.eq(status.as_str()))
                .execute(connection)
                .map_err(ShopStoreError::persistence)?;
            ensure_found(updated, ShopStoreError::JobNotFound(id))
        })
        .await
    }

    async fn delete_job(&self, id: JobId) -> ShopStoreResult<()> {
        self.run_blocking(move |connection| {
            // Details, programs and logs go with the job through ON DELETE CASCADE.
            let deleted = diesel::delete(cutting_jobs::table.find(id.value()))
                .execute(connection)
                .map_err(ShopStoreError::persistence)?;
            ensure_found(deleted, ShopStoreError::JobNotFound(id))
        })
        .await
    }
}

#[async_trait]
impl ArticleRepository for PostgresShopStore {
    async fn insert_article(&self, draft: &ArticleDraft) -> ShopStoreResult<Article> {
        let changeset = to_article_changeset(draft);
        let number = draft.article_num.clone();
        self.run_blocking(move |connection| {
            let stored = diesel::insert_into(articles::table)
                .values(&changeset)
                .returning(ArticleRow::as_returning())
                .get_result(connection)
                .map_err(|err| map_article_write_error(err, &number))?;
            row_to_article(stored)
        })
        .await
    }

    async fn update_article(
        &self,
        id: ArticleId,
        draft: &ArticleDraft,
    ) -> ShopStoreResult<Article> {
        let changeset = to_article_changeset(draft);
        let number = draft.article_num.clone();
        self.run_blocking(move |connection| {
            let stored = diesel::update(articles::table.find(id.value()))
                .set(&changeset)
                .returning(ArticleRow::as_returning())
                .get_result(connection)
                .optional()
                .map_err(|err| map_article_write_error(err, &number))?
                .ok_or(ShopStoreError::ArticleNotFound(id))?;
            row_to_article(stored)
        })
        .await
    }

    async fn delete_article(&self, id: ArticleId) -> ShopStoreResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(articles::table.find(id.value()))
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        ShopStoreError::ArticleInUse(id)
                    }
                    _ => ShopStoreError::persistence(err),
                })?;
            ensure_found(deleted, ShopStoreError::ArticleNotFound(id))
        })
        .await
    }

    async fn find_article(&self, id: ArticleId) -> ShopStoreResult<Option<Article>> {
        self.run_blocking(move |connection| {
            articles::table
                .find(id.value())
                .select(ArticleRow::as_select())
                .first(connection)
                .optional()
                .map_err(ShopStoreError::persistence)?
                .map(row_to_article)
                .transpose()
        })
        .await
    }

    async fn find_article_by_number(
        &self,
        number: &ArticleNumber,
    ) -> ShopStoreResult<Option<Article>> {
        let lookup = number.as_str().to_owned();
        self.run_blocking(move |connection| {
            articles::table
                .filter(articles::article_num.eq(lookup))
                .select(ArticleRow::as_select())
                .first(connection)
                .optional()
                .map_err(ShopStoreError::persistence)?
                .map(row_to_article)
                .transpose()
        })
        .await
    }

    async fn list_articles(&self, query: &ArticleQuery) -> ShopStoreResult<Vec<Article>> {
        let search = query
            .search
            .as_ref()
            .map(|(field, term)| (*field, like_pattern(term.trim())));
        let sort = query.sort;
        let limit = query
            .limit
            .map(i64::try_from)
            .transpose()
            .map_err(ShopStoreError::persistence)?;
        self.run_blocking(move |connection| {
            let mut statement = articles::table
                .select(ArticleRow::as_select())
                .into_boxed::<Pg>();
            if let Some((field, pattern)) = search {
                statement = match field {
                    ArticleSearchField::Name => statement.filter(articles::name.ilike(pattern)),
                    ArticleSearchField::ArticleNumber => {
                        statement.filter(articles::article_num.ilike(pattern))
                    }
                    ArticleSearchField::MaterialType => {
                        statement.filter(articles::material_type.ilike(pattern))
                    }
                    ArticleSearchField::NameOrNumber => statement.filter(
                        articles::name
                            .ilike(pattern.clone())
                            .or(articles::article_num.ilike(pattern)),
                    ),
                };
            }
            statement = match (sort.field, sort.direction) {
                (ArticleSortField::Id, SortDirection::Ascending) => {
                    statement.order(articles::article_id.asc())
                }
                (ArticleSortField::Id, SortDirection::Descending) => {
                    statement.order(articles::article_id.desc())
                }
                (ArticleSortField::Name, SortDirection::Ascending) => {
                    statement.order(articles::name.asc())
                }
                (ArticleSortField::Name, SortDirection::Descending) => {
                    statement.order(articles::name.desc())
                }
                (ArticleSortField::ArticleNumber, SortDirection::Ascending) => {
                    statement.order(articles::article_num.asc())
                }
                (ArticleSortField::ArticleNumber, SortDirection::Descending) => {
                    statement.order(articles::article_num.desc())
                }
                (ArticleSortField::Thickness, SortDirection::Ascending) => {
                    statement.order(articles::thickness.asc())
                }
                (ArticleSortField::Thickness, SortDirection::Descending) => {
                    statement.order(articles::thickness.desc())
                }
                (ArticleSortField::MaterialType, SortDirection::Ascending) => {
                    statement.order(articles::material_type.asc())
                }
                (ArticleSortField::MaterialType, SortDirection::Descending) => {
                    statement.order(articles::material_type.desc())
                }
            };
            if let Some(rows) = limit {
                statement = statement.limit(rows);
            }
            statement
                .load(connection)
                .map_err(ShopStoreError::persistence)?
                .into_iter()
                .map(row_to_article)
                .collect()
        })
        .await
    }

    async fn count_article_usage(&self, id: ArticleId) -> ShopStoreResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = job_details::table
                .filter(job_details::article_id.eq(id.value()))
                .count()
                .get_result(connection)
                .map_err(ShopStoreError::persistence)?;
            u64::try_from(count).map_err(ShopStoreError::persistence)
        })
        .await
    }
}

#[async_trait]
impl JobDetailRepository for PostgresShopStore {
    async fn insert_details(&self, details: &[NewJobDetail]) -> ShopStoreResult<Vec<JobDetail>> {
        if details.is_empty() {
            return Ok(Vec::new());
        }
        let rows = details
            .iter()
            .map(to_new_detail_row)
            .collect::<ShopStoreResult<Vec<_>>>()?;
        self.run_blocking(move |connection| {
            diesel::insert_into(job_details::table)
                .values(&rows)
                .returning(DetailRow::as_returning())
                .get_results(connection)
                .map_err(|err| map_detail_insert_error(err, &rows))?
                .into_iter()
                .map(row_to_detail)
                .collect()
        })
        .await
    }

    async fn list_details(&self, job_id: JobId) -> ShopStoreResult<Vec<JobDetailLine>> {
        self.run_blocking(move |connection| {
            let rows: Vec<(DetailRow, Option<ArticleRow>)> = job_details::table
                .left_join(articles::table)
                .filter(job_details::job_id.eq(job_id.value()))
                .order(job_details::job_detail_id.asc())
                .select((DetailRow::as_select(), Option::<ArticleRow>::as_select()))
                .load(connection)
                .map_err(ShopStoreError::persistence)?;
            rows.into_iter()
                .map(|(detail, article)| {
                    Ok(JobDetailLine {
                        detail: row_to_detail(detail)?,
                        article: article.map(row_to_article).transpose()?,
                    })
                })
                .collect()
        })
        .await
    }

    async fn update_detail_counts(
        &self,
        id: JobDetailId,
        counts: DetailCounts,
    ) -> ShopStoreResult<()> {
        let actual = counts.quantity_actual.map(to_i32).transpose()?;
        let rejected = counts.rejection_count.map(to_i32).transpose()?;
        self.run_blocking(move |connection| {
            let updated = diesel::update(job_details::table.find(id.value()))
                .set((
                    job_details::quantity_actual.eq(actual),
                    job_details::rejection_count.eq(rejected),
                ))
                .execute(connection)
                .map_err(ShopStoreError::persistence)?;
            ensure_found(updated, ShopStoreError::DetailNotFound(id))
        })
        .await
    }

    async fn update_planned_quantity(
        &self,
        id: JobDetailId,
        quantity: PlannedQuantity,
    ) -> ShopStoreResult<()> {
        let planned = to_i32(quantity.value())?;
        self.run_blocking(move |connection| {
            let updated = diesel::update(job_details::table.find(id.value()))
                .set(job_details::quantity_planned.eq(planned))
                .execute(connection)
                .map_err(ShopStoreError::persistence)?;
            ensure_found(updated, ShopStoreError::DetailNotFound(id))
        })
        .await
    }

    async fn delete_detail(&self, id: JobDetailId) -> ShopStoreResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(job_details::table.find(id.value()))
                .execute(connection)
                .map_err(ShopStoreError::persistence)?;
            ensure_found(deleted, ShopStoreError::DetailNotFound(id))
        })
        .await
    }
}

#[async_trait]
impl ProgramRepository for PostgresShopStore {
    async fn insert_program(
        &self,
        program: &NewCuttingProgram,
    ) -> ShopStoreResult<CuttingProgram> {
        let job_id = program.job_id;
        let row = NewProgramRow {
            job_id: job_id.value(),
            file_name: program.file_name.as_str().to_owned(),
        };
        self.run_blocking(move |connection| {
            let stored = diesel::insert_into(cutting_programs::table)
                .values(&row)
                .returning(ProgramRow::as_returning())
                .get_result(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_constraint(info.as_ref(), PROGRAM_PER_JOB_UNIQUE) =>
                    {
                        ShopStoreError::ProgramAlreadyExists(job_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        ShopStoreError::JobNotFound(job_id)
                    }
                    _ => ShopStoreError::persistence(err),
                })?;
            row_to_program(stored)
        })
        .await
    }

    async fn find_program_for_job(&self, job_id: JobId) -> ShopStoreResult<Option<CuttingProgram>> {
        self.run_blocking(move |connection| {
            cutting_programs::table
                .filter(cutting_programs::job_id.eq(job_id.value()))
                .order(cutting_programs::program_id.asc())
                .select(ProgramRow::as_select())
                .first(connection)
                .optional()
                .map_err(ShopStoreError::persistence)?
                .map(row_to_program)
                .transpose()
        })
        .await
    }

    async fn list_programs(&self, job_id: JobId) -> ShopStoreResult<Vec<CuttingProgram>> {
        self.run_blocking(move |connection| {
            cutting_programs::table
                .filter(cutting_programs::job_id.eq(job_id.value()))
                .order(cutting_programs::program_id.asc())
                .select(ProgramRow::as_select())
                .load(connection)
                .map_err(ShopStoreError::persistence)?
                .into_iter()
                .map(row_to_program)
                .collect()
        })
        .await
    }

    async fn rename_program(
        &self,
        id: ProgramId,
        file_name: &ProgramFileName,
    ) -> ShopStoreResult<CuttingProgram> {
        let name = file_name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let stored = diesel::update(cutting_programs::table.find(id.value()))
                .set(cutting_programs::file_name.eq(name))
                .returning(ProgramRow::as_returning())
                .get_result(connection)
                .optional()
                .map_err(ShopStoreError::persistence)?
                .ok_or(ShopStoreError::ProgramNotFound(id))?;
            row_to_program(stored)
        })
        .await
    }
}

#[async_trait]
impl CuttingLogRepository for PostgresShopStore {
    async fn insert_log(&self, entry: &NewCuttingLogEntry) -> ShopStoreResult<CuttingLogEntry> {
        let program_id = entry.program_id;
        let row = NewLogRow {
            program_id: program_id.value(),
            values: to_log_values(&entry.fields)?,
            start_time: Some(entry.start_time),
        };
        self.run_blocking(move |connection| {
            let stored = diesel::insert_into(cutting_log::table)
                .values(&row)
                .returning(LogRow::as_returning())
                .get_result(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        ShopStoreError::ProgramNotFound(program_id)
                    }
                    _ => ShopStoreError::persistence(err),
                })?;
            row_to_log(stored)
        })
        .await
    }

    async fn update_log(&self, update: &LogUpdate) -> ShopStoreResult<CuttingLogEntry> {
        let id = update.id;
        let values = to_log_values(&update.fields)?;
        let end_time = update.end_time;
        self.run_blocking(move |connection| {
            let stored = diesel::update(cutting_log::table.find(id.value()))
                .set((&values, cutting_log::end_time.eq(Some(end_time))))
                .returning(LogRow::as_returning())
                .get_result(connection)
                .optional()
                .map_err(ShopStoreError::persistence)?
                .ok_or(ShopStoreError::LogNotFound(id))?;
            row_to_log(stored)
        })
        .await
    }

    async fn latest_log(&self, program_id: ProgramId) -> ShopStoreResult<Option<CuttingLogEntry>> {
        self.run_blocking(move |connection| {
            cutting_log::table
                .filter(cutting_log::program_id.eq(program_id.value()))
                .order((
                    cutting_log::start_time.desc().nulls_last(),
                    cutting_log::log_entry_id.desc(),
                ))
                .select(LogRow::as_select())
                .first(connection)
                .optional()
                .map_err(ShopStoreError::persistence)?
                .map(row_to_log)
                .transpose()
        })
        .await
    }

    async fn list_logs(&self, program_id: ProgramId) -> ShopStoreResult<Vec<CuttingLogEntry>> {
        self.run_blocking(move |connection| {
            cutting_log::table
                .filter(cutting_log::program_id.eq(program_id.value()))
                .order(cutting_log::log_entry_id.asc())
                .select(LogRow::as_select())
                .load(connection)
                .map_err(ShopStoreError::persistence)?
                .into_iter()
                .map(row_to_log)
                .collect()
        })
        .await
    }
}

fn ensure_found(affected: usize, missing: ShopStoreError) -> ShopStoreResult<()> {
    if affected == 0 {
        return Err(missing);
    }
    Ok(())
}

fn is_constraint(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}

fn map_article_write_error(err: DieselError, number: &ArticleNumber) -> ShopStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_constraint(info.as_ref(), ARTICLE_NUMBER_UNIQUE) =>
        {
            ShopStoreError::DuplicateArticleNumber(number.clone())
        }
        _ => ShopStoreError::persistence(err),
    }
}

fn map_detail_insert_error(err: DieselError, rows: &[NewDetailRow]) -> ShopStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_constraint(info.as_ref(), JOB_ARTICLE_UNIQUE) =>
        {
            // The server does not say which pair collided; report the first row.
            rows.first().map_or_else(
                || ShopStoreError::persistence(std::io::Error::other(err.to_string())),
                |row| ShopStoreError::DuplicateJobArticle {
                    job_id: JobId::new(row.job_id),
                    article_id: ArticleId::new(row.article_id),
                },
            )
        }
        _ => ShopStoreError::persistence(err),
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn to_i32(value: u32) -> ShopStoreResult<i32> {
    i32::try_from(value).map_err(ShopStoreError::persistence)
}

fn to_u32(value: i32) -> ShopStoreResult<u32> {
    u32::try_from(value).map_err(ShopStoreError::persistence)
}

fn to_article_changeset(draft: &ArticleDraft) -> ArticleChangeset {
    ArticleChangeset {
        article_num: draft.article_num.as_str().to_owned(),
        name: draft.name.clone(),
        thickness: draft.thickness,
        material_type: draft.material_type.clone(),
        file_url: draft.file_url.clone(),
    }
}

fn to_new_detail_row(detail: &NewJobDetail) -> ShopStoreResult<NewDetailRow> {
    Ok(NewDetailRow {
        job_id: detail.job_id.value(),
        article_id: detail.article_id.value(),
        quantity_planned: to_i32(detail.quantity_planned.value())?,
        quantity_actual: detail.counts.quantity_actual.map(to_i32).transpose()?,
        rejection_count: detail.counts.rejection_count.map(to_i32).transpose()?,
    })
}

fn to_log_values(fields: &LogFields) -> ShopStoreResult<LogValues> {
    Ok(LogValues {
        operator_name: fields.operator_name.clone(),
        cut_date: fields.cut_date,
        start_meter: fields.start_meter,
        end_meter: fields.end_meter,
        oxygen_pressure: if fields.air_used {
            None
        } else {
            fields.oxygen_pressure
        },
        air_pressure: i16::from(fields.air_used),
        preparation_time_minutes: fields.preparation_time_minutes.map(to_i32).transpose()?,
        cutting_time_minutes: fields.cutting_time_minutes.map(to_i32).transpose()?,
    })
}

fn row_to_job(row: JobRow) -> ShopStoreResult<CuttingJob> {
    let status = JobStatus::try_from(row.status.as_str()).map_err(ShopStoreError::persistence)?;
    Ok(CuttingJob::from_persisted(PersistedJobData {
        id: JobId::new(row.job_id),
        status,
        due_date: row.due_date,
        notes: row.notes,
        creation_date: row.creation_date,
    }))
}

fn row_to_article(row: ArticleRow) -> ShopStoreResult<Article> {
    let fields = ArticleDraft::new(
        row.article_num,
        row.name,
        row.thickness,
        row.material_type,
        row.file_url,
    )
    .map_err(ShopStoreError::persistence)?;
    Ok(Article::from_persisted(ArticleId::new(row.article_id), fields))
}

fn row_to_detail(row: DetailRow) -> ShopStoreResult<JobDetail> {
    let quantity_planned = PlannedQuantity::new(i64::from(row.quantity_planned))
        .map_err(ShopStoreError::persistence)?;
    Ok(JobDetail {
        id: JobDetailId::new(row.job_detail_id),
        job_id: JobId::new(row.job_id),
        article_id: ArticleId::new(row.article_id),
        quantity_planned,
        counts: DetailCounts {
            quantity_actual: row.quantity_actual.map(to_u32).transpose()?,
            rejection_count: row.rejection_count.map(to_u32).transpose()?,
        },
    })
}

fn row_to_program(row: ProgramRow) -> ShopStoreResult<CuttingProgram> {
    let file_name = ProgramFileName::new(row.file_name).map_err(ShopStoreError::persistence)?;
    Ok(CuttingProgram {
        id: ProgramId::new(row.program_id),
        job_id: JobId::new(row.job_id),
        file_name,
    })
}

fn row_to_log(row: LogRow) -> ShopStoreResult<CuttingLogEntry> {
    let air_used = row.air_pressure != 0;
    Ok(CuttingLogEntry {
        id: LogEntryId::new(row.log_entry_id),
        program_id: ProgramId::new(row.program_id),
        fields: LogFields {
            operator_name: row.operator_name,
            cut_date: row.cut_date,
            start_meter: row.start_meter,
            end_meter: row.end_meter,
            oxygen_pressure: if air_used { None } else { row.oxygen_pressure },
            air_used,
            preparation_time_minutes: row.preparation_time_minutes.map(to_u32).transpose()?,
            cutting_time_minutes: row.cutting_time_minutes.map(to_u32).transpose()?,
        },
        start_time: row.start_time,
        end_time: row.end_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("plate", "%plate%")]
    fn like_patterns_escape_wildcards(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(term), expected);
    }

    #[test]
    fn air_flag_round_trips_through_smallint() {
        let fields = LogFields {
            operator_name: "Ivan".to_owned(),
            oxygen_pressure: Some(12.0),
            air_used: true,
            ..LogFields::default()
        };
        let values = to_log_values(&fields).expect("values");
        assert_eq!(values.air_pressure, 1);
        assert_eq!(values.oxygen_pressure, None);

        let row = LogRow {
            log_entry_id: 1,
            program_id: 2,
            operator_name: values.operator_name,
            cut_date: None,
            start_meter: None,
            end_meter: None,
            oxygen_pressure: Some(3.0),
            air_pressure: values.air_pressure,
            preparation_time_minutes: Some(5),
            cutting_time_minutes: None,
            start_time: None,
            end_time: None,
        };
        let entry = row_to_log(row).expect("entry");
        assert!(entry.fields.air_used);
        assert_eq!(entry.fields.oxygen_pressure, None);
        assert_eq!(entry.fields.preparation_time_minutes, Some(5));
    }

    #[test]
    fn legacy_status_labels_are_accepted() {
        let row = JobRow {
            job_id: 4,
            status: "Виконано".to_owned(),
            due_date: None,
            notes: String::new(),
            creation_date: chrono::Utc::now(),
        };
        let job = row_to_job(row).expect("job");
        assert_eq!(job.status(), JobStatus::Done);
    }

    #[test]
    fn negative_counts_are_rejected_as_corrupt() {
        let row = DetailRow {
            job_detail_id: 1,
            job_id: 1,
            article_id: 1,
            quantity_planned: 2,
            quantity_actual: Some(-1),
            rejection_count: None,
        };
        assert!(matches!(
            row_to_detail(row),
            Err(ShopStoreError::Persistence(_))
        ));
    }
}
