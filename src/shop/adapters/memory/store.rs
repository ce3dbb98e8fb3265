//! In-memory shop store for tests and demos.
//!
//! Mirrors the relational constraints of the `PostgreSQL` schema: serial
//! keys, unique article numbers, one program per job, one row per
//! job/article pair, restricted article deletion and cascading job deletion.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::shop::{
    domain::{
        Article, ArticleDraft, ArticleId, ArticleNumber, ArticleQuery, CuttingJob, CuttingLogEntry,
        CuttingProgram, DetailCounts, JobDetail, JobDetailId, JobDetailLine, JobId, JobQuery,
        JobStatus, LogEntryId, LogUpdate, NewCuttingJob, NewCuttingLogEntry, NewCuttingProgram,
        NewJobDetail, PersistedJobData, PlannedQuantity, ProgramFileName, ProgramId,
    },
    ports::{
        ArticleRepository, CuttingLogRepository, JobDetailRepository, JobRepository,
        ProgramRepository, ShopStoreError, ShopStoreResult,
    },
};

/// Thread-safe in-memory implementation of every shop repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShopStore {
    state: Arc<RwLock<ShopState>>,
}

#[derive(Debug, Default)]
struct ShopState {
    jobs: BTreeMap<JobId, CuttingJob>,
    articles: BTreeMap<ArticleId, Article>,
    details: BTreeMap<JobDetailId, JobDetail>,
    programs: BTreeMap<ProgramId, CuttingProgram>,
    logs: BTreeMap<LogEntryId, CuttingLogEntry>,
    serials: Serials,
}

#[derive(Debug, Default)]
struct Serials {
    job: i64,
    article: i64,
    detail: i64,
    program: i64,
    log: i64,
}

fn next_serial(counter: &mut i64) -> i64 {
    *counter = counter.saturating_add(1);
    *counter
}

fn poisoned<T>(err: &PoisonError<T>) -> ShopStoreError {
    ShopStoreError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryShopStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, query: impl FnOnce(&ShopState) -> R) -> ShopStoreResult<R> {
        let state = self.state.read().map_err(|err| poisoned(&err))?;
        Ok(query(&state))
    }

    fn write<R>(
        &self,
        command: impl FnOnce(&mut ShopState) -> ShopStoreResult<R>,
    ) -> ShopStoreResult<R> {
        let mut state = self.state.write().map_err(|err| poisoned(&err))?;
        command(&mut state)
    }
}

impl ShopState {
    fn number_taken(&self, number: &ArticleNumber, except: Option<ArticleId>) -> bool {
        self.articles
            .values()
            .any(|article| article.article_num() == number && Some(article.id()) != except)
    }

    fn program_ids_for(&self, job_id: JobId) -> Vec<ProgramId> {
        self.programs
            .values()
            .filter(|program| program.job_id == job_id)
            .map(|program| program.id)
            .collect()
    }

    fn detail_line(&self, detail: &JobDetail) -> JobDetailLine {
        JobDetailLine {
            detail: *detail,
            article: self.articles.get(&detail.article_id).cloned(),
        }
    }
}

#[async_trait]
impl JobRepository for InMemoryShopStore {
    async fn insert_job(&self, job: &NewCuttingJob) -> ShopStoreResult<CuttingJob> {
        self.write(|state| {
            let id = JobId::new(next_serial(&mut state.serials.job));
            let stored = CuttingJob::from_persisted(PersistedJobData {
                id,
                status: job.status,
                due_date: job.due_date,
                notes: job.notes.clone(),
                creation_date: job.creation_date,
            });
            state.jobs.insert(id, stored.clone());
            Ok(stored)
        })
    }

    async fn find_job(&self, id: JobId) -> ShopStoreResult<Option<CuttingJob>> {
        self.read(|state| state.jobs.get(&id).cloned())
    }

    async fn list_jobs(&self, query: &JobQuery) -> ShopStoreResult<Vec<CuttingJob>> {
        self.read(|state| {
            state
                .jobs
                .values()
                .rev()
                .filter(|job| query.matches(job))
                .cloned()
                .collect()
        })
    }

    async fn update_job(&self, job: &CuttingJob) -> ShopStoreResult<()> {
        self.write(|state| {
            let stored = state
                .jobs
                .get_mut(&job.id())
                .ok_or(ShopStoreError::JobNotFound(job.id()))?;
            *stored = job.clone();
            Ok(())
        })
    }

    async fn update_job_status(&self, id: JobId, status: JobStatus) -> ShopStoreResult<()> {
        self.write(|state| {
            let stored = state
                .jobs
                .get(&id)
                .ok_or(ShopStoreError::JobNotFound(id))?;
            let updated = CuttingJob::from_persisted(PersistedJobData {
                id,
                status,
                due_date: stored.due_date(),
                notes: stored.notes().to_owned(),
                creation_date: stored.creation_date(),
            });
            state.jobs.insert(id, updated);
            Ok(())
        })
    }

    async fn delete_job(&self, id: JobId) -> ShopStoreResult<()> {
        self.write(|state| {
            if state.jobs.remove(&id).is_none() {
                return Err(ShopStoreError::JobNotFound(id));
            }
            let program_ids = state.program_ids_for(id);
            state
                .logs
                .retain(|_, log| !program_ids.contains(&log.program_id));
            state.programs.retain(|_, program| program.job_id != id);
            state.details.retain(|_, detail| detail.job_id != id);
            Ok(())
        })
    }
}

#[async_trait]
impl ArticleRepository for InMemoryShopStore {
    async fn insert_article(&self, draft: &ArticleDraft) -> ShopStoreResult<Article> {
        self.write(|state| {
            if state.number_taken(&draft.article_num, None) {
                return Err(ShopStoreError::DuplicateArticleNumber(
                    draft.article_num.clone(),
                ));
            }
            let id = ArticleId::new(next_serial(&mut state.serials.article));
            let article = Article::from_persisted(id, draft.clone());
            state.articles.insert(id, article.clone());
            Ok(article)
        })
    }

    async fn update_article(
        &self,
        id: ArticleId,
        draft: &ArticleDraft,
    ) -> ShopStoreResult<Article> {
        self.write(|state| {
            if !state.articles.contains_key(&id) {
                return Err(ShopStoreError::ArticleNotFound(id));
            }
            if state.number_taken(&draft.article_num, Some(id)) {
                return Err(ShopStoreError::DuplicateArticleNumber(
                    draft.article_num.clone(),
                ));
            }
            let article = Article::from_persisted(id, draft.clone());
            state.articles.insert(id, article.clone());
            Ok(article)
        })
    }

    async fn delete_article(&self, id: ArticleId) -> ShopStoreResult<()> {
        self.write(|state| {
            if state.details.values().any(|detail| detail.article_id == id) {
                return Err(ShopStoreError::ArticleInUse(id));
            }
            state
                .articles
                .remove(&id)
                .map(|_| ())
                .ok_or(ShopStoreError::ArticleNotFound(id))
        })
    }

    async fn find_article(&self, id: ArticleId) -> ShopStoreResult<Option<Article>> {
        self.read(|state| state.articles.get(&id).cloned())
    }

    async fn find_article_by_number(
        &self,
        number: &ArticleNumber,
    ) -> ShopStoreResult<Option<Article>> {
        self.read(|state| {
            state
                .articles
                .values()
                .find(|article| article.article_num() == number)
                .cloned()
        })
    }

    async fn list_articles(&self, query: &ArticleQuery) -> ShopStoreResult<Vec<Article>> {
        self.read(|state| {
            let mut articles: Vec<Article> = match &query.search {
                Some((field, term)) => {
                    let needle = term.trim().to_lowercase();
                    state
                        .articles
                        .values()
                        .filter(|article| field.matches(article, &needle))
                        .cloned()
                        .collect()
                }
                None => state.articles.values().cloned().collect(),
            };
            articles.sort_by(|left, right| {
                query
                    .sort
                    .direction
                    .apply(query.sort.field.compare(left, right))
            });
            if let Some(limit) = query.limit {
                articles.truncate(limit);
            }
            articles
        })
    }

    async fn count_article_usage(&self, id: ArticleId) -> ShopStoreResult<u64> {
        self.read(|state| {
            let count = state
                .details
                .values()
                .filter(|detail| detail.article_id == id)
                .count();
            u64::try_from(count).unwrap_or(u64::MAX)
        })
    }
}

#[async_trait]
impl JobDetailRepository for InMemoryShopStore {
    async fn insert_details(&self, details: &[NewJobDetail]) -> ShopStoreResult<Vec<JobDetail>> {
        self.write(|state| {
            for (position, detail) in details.iter().enumerate() {
                if !state.jobs.contains_key(&detail.job_id) {
                    return Err(ShopStoreError::JobNotFound(detail.job_id));
                }
                if !state.articles.contains_key(&detail.article_id) {
                    return Err(ShopStoreError::ArticleNotFound(detail.article_id));
                }
                let same_pair = |other: &NewJobDetail| {
                    other.job_id == detail.job_id && other.article_id == detail.article_id
                };
                let stored_twice = state.details.values().any(|stored| {
                    stored.job_id == detail.job_id && stored.article_id == detail.article_id
                });
                if stored_twice || details.iter().take(position).any(same_pair) {
                    return Err(ShopStoreError::DuplicateJobArticle {
                        job_id: detail.job_id,
                        article_id: detail.article_id,
                    });
                }
            }
            let stored = details
                .iter()
                .map(|detail| {
                    let id = JobDetailId::new(next_serial(&mut state.serials.detail));
                    let row = JobDetail {
                        id,
                        job_id: detail.job_id,
                        article_id: detail.article_id,
                        quantity_planned: detail.quantity_planned,
                        counts: detail.counts,
                    };
                    state.details.insert(id, row);
                    row
                })
                .collect();
            Ok(stored)
        })
    }

    async fn list_details(&self, job_id: JobId) -> ShopStoreResult<Vec<JobDetailLine>> {
        self.read(|state| {
            state
                .details
                .values()
                .filter(|detail| detail.job_id == job_id)
                .map(|detail| state.detail_line(detail))
                .collect()
        })
    }

    async fn update_detail_counts(
        &self,
        id: JobDetailId,
        counts: DetailCounts,
    ) -> ShopStoreResult<()> {
        self.write(|state| {
            let detail = state
                .details
                .get_mut(&id)
                .ok_or(ShopStoreError::DetailNotFound(id))?;
            detail.counts = counts;
            Ok(())
        })
    }

    async fn update_planned_quantity(
        &self,
        id: JobDetailId,
        quantity: PlannedQuantity,
    ) -> ShopStoreResult<()> {
        self.write(|state| {
            let detail = state
                .details
                .get_mut(&id)
                .ok_or(ShopStoreError::DetailNotFound(id))?;
            detail.quantity_planned = quantity;
            Ok(())
        })
    }

    async fn delete_detail(&self, id: JobDetailId) -> ShopStoreResult<()> {
        self.write(|state| {
            state
                .details
                .remove(&id)
                .map(|_| ())
                .ok_or(ShopStoreError::DetailNotFound(id))
        })
    }
}

#[async_trait]
impl ProgramRepository for InMemoryShopStore {
    async fn insert_program(
        &self,
        program: &NewCuttingProgram,
    ) -> ShopStoreResult<CuttingProgram> {
        self.write(|state| {
            if !state.jobs.contains_key(&program.job_id) {
                return Err(ShopStoreError::JobNotFound(program.job_id));
            }
            if !state.program_ids_for(program.job_id).is_empty() {
                return Err(ShopStoreError::ProgramAlreadyExists(program.job_id));
            }
            let id = ProgramId::new(next_serial(&mut state.serials.program));
            let stored = CuttingProgram {
                id,
                job_id: program.job_id,
                file_name: program.file_name.clone(),
            };
            state.programs.insert(id, stored.clone());
            Ok(stored)
        })
    }

    async fn find_program_for_job(&self, job_id: JobId) -> ShopStoreResult<Option<CuttingProgram>> {
        self.read(|state| {
            state
                .programs
                .values()
                .find(|program| program.job_id == job_id)
                .cloned()
        })
    }

    async fn list_programs(&self, job_id: JobId) -> ShopStoreResult<Vec<CuttingProgram>> {
        self.read(|state| {
            state
                .programs
                .values()
                .filter(|program| program.job_id == job_id)
                .cloned()
                .collect()
        })
    }

    async fn rename_program(
        &self,
        id: ProgramId,
        file_name: &ProgramFileName,
    ) -> ShopStoreResult<CuttingProgram> {
        self.write(|state| {
            let program = state
                .programs
                .get_mut(&id)
                .ok_or(ShopStoreError::ProgramNotFound(id))?;
            program.file_name = file_name.clone();
            Ok(program.clone())
        })
    }
}

#[async_trait]
impl CuttingLogRepository for InMemoryShopStore {
    async fn insert_log(&self, entry: &NewCuttingLogEntry) -> ShopStoreResult<CuttingLogEntry> {
        self.write(|state| {
            if !state.programs.contains_key(&entry.program_id) {
                return Err(ShopStoreError::ProgramNotFound(entry.program_id));
            }
            let id = LogEntryId::new(next_serial(&mut state.serials.log));
            let stored = CuttingLogEntry {
                id,
                program_id: entry.program_id,
                fields: entry.fields.clone(),
                start_time: Some(entry.start_time),
                end_time: None,
            };
            state.logs.insert(id, stored.clone());
            Ok(stored)
        })
    }

    async fn update_log(&self, update: &LogUpdate) -> ShopStoreResult<CuttingLogEntry> {
        self.write(|state| {
            let log = state
                .logs
                .get_mut(&update.id)
                .ok_or(ShopStoreError::LogNotFound(update.id))?;
            log.fields = update.fields.clone();
            log.end_time = Some(update.end_time);
            Ok(log.clone())
        })
    }

    async fn latest_log(&self, program_id: ProgramId) -> ShopStoreResult<Option<CuttingLogEntry>> {
        self.read(|state| {
            state
                .logs
                .values()
                .filter(|log| log.program_id == program_id)
                .max_by_key(|log| (log.start_time, log.id))
                .cloned()
        })
    }

    async fn list_logs(&self, program_id: ProgramId) -> ShopStoreResult<Vec<CuttingLogEntry>> {
        self.read(|state| {
            state
                .logs
                .values()
                .filter(|log| log.program_id == program_id)
                .cloned()
                .collect()
        })
    }
}
