//! Store double that fails one chosen write and delegates everything else
//! to a shared in-memory store.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::shop::{
    adapters::memory::InMemoryShopStore,
    domain::{
        Article, ArticleDraft, ArticleId, ArticleNumber, ArticleQuery, CuttingJob,
        CuttingLogEntry, CuttingProgram, DetailCounts, JobDetail, JobDetailId, JobDetailLine,
        JobId, JobQuery, JobStatus, LogUpdate, NewCuttingJob, NewCuttingLogEntry,
        NewCuttingProgram, NewJobDetail, PlannedQuantity, ProgramFileName, ProgramId,
    },
    ports::{
        ArticleRepository, CuttingLogRepository, JobDetailRepository, JobRepository,
        ProgramRepository, ShopStoreError, ShopStoreResult,
    },
};

/// Write that the double refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    DetailInsert,
    DetailCounts,
    JobStatus,
}

pub struct FaultyStore {
    inner: InMemoryShopStore,
    fault: Mutex<Option<Fault>>,
}

impl FaultyStore {
    /// Wraps `inner` with no fault armed; clones of `inner` see every
    /// write that goes through.
    pub const fn new(inner: InMemoryShopStore) -> Self {
        Self {
            inner,
            fault: Mutex::new(None),
        }
    }

    pub fn failing(inner: InMemoryShopStore, fault: Fault) -> Self {
        let store = Self::new(inner);
        store.arm(fault);
        store
    }

    pub fn arm(&self, fault: Fault) {
        *self.fault.lock().unwrap_or_else(PoisonError::into_inner) = Some(fault);
    }

    fn check(&self, write: Fault) -> ShopStoreResult<()> {
        if *self.fault.lock().unwrap_or_else(PoisonError::into_inner) == Some(write) {
            return Err(ShopStoreError::persistence(std::io::Error::other(
                "connection reset",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl JobRepository for FaultyStore {
    async fn insert_job(&self, job: &NewCuttingJob) -> ShopStoreResult<CuttingJob> {
        self.inner.insert_job(job).await
    }
    async fn find_job(&self, id: JobId) -> ShopStoreResult<Option<CuttingJob>> {
        self.inner.find_job(id).await
    }
    async fn list_jobs(&self, query: &JobQuery) -> ShopStoreResult<Vec<CuttingJob>> {
        self.inner.list_jobs(query).await
    }
    async fn update_job(&self, job: &CuttingJob) -> ShopStoreResult<()> {
        self.inner.update_job(job).await
    }
    async fn update_job_status(&self, id: JobId, status: JobStatus) -> ShopStoreResult<()> {
        self.check(Fault::JobStatus)?;
        self.inner.update_job_status(id, status).await
    }
    async fn delete_job(&self, id: JobId) -> ShopStoreResult<()> {
        self.inner.delete_job(id).await
    }
}

#[async_trait]
impl ArticleRepository for FaultyStore {
    async fn insert_article(&self, draft: &ArticleDraft) -> ShopStoreResult<Article> {
        self.inner.insert_article(draft).await
    }
    async fn update_article(&self, id: ArticleId, draft: &ArticleDraft) -> ShopStoreResult<Article> {
        self.inner.update_article(id, draft).await
    }
    async fn delete_article(&self, id: ArticleId) -> ShopStoreResult<()> {
        self.inner.delete_article(id).await
    }
    async fn find_article(&self, id: ArticleId) -> ShopStoreResult<Option<Article>> {
        self.inner.find_article(id).await
    }
    async fn find_article_by_number(
        &self,
        number: &ArticleNumber,
    ) -> ShopStoreResult<Option<Article>> {
        self.inner.find_article_by_number(number).await
    }
    async fn list_articles(&self, query: &ArticleQuery) -> ShopStoreResult<Vec<Article>> {
        self.inner.list_articles(query).await
    }
    async fn count_article_usage(&self, id: ArticleId) -> ShopStoreResult<u64> {
        self.inner.count_article_usage(id).await
    }
}

#[async_trait]
impl JobDetailRepository for FaultyStore {
    async fn insert_details(&self, details: &[NewJobDetail]) -> ShopStoreResult<Vec<JobDetail>> {
        self.check(Fault::DetailInsert)?;
        self.inner.insert_details(details).await
    }
    async fn list_details(&self, job_id: JobId) -> ShopStoreResult<Vec<JobDetailLine>> {
        self.inner.list_details(job_id).await
    }
    async fn update_detail_counts(&self, id: JobDetailId, counts: DetailCounts) -> ShopStoreResult<()> {
        self.check(Fault::DetailCounts)?;
        self.inner.update_detail_counts(id, counts).await
    }
    async fn update_planned_quantity(
        &self,
        id: JobDetailId,
        quantity: PlannedQuantity,
    ) -> ShopStoreResult<()> {
        self.inner.update_planned_quantity(id, quantity).await
    }
    async fn delete_detail(&self, id: JobDetailId) -> ShopStoreResult<()> {
        self.inner.delete_detail(id).await
    }
}

#[async_trait]
impl ProgramRepository for FaultyStore {
    async fn insert_program(&self, program: &NewCuttingProgram) -> ShopStoreResult<CuttingProgram> {
        self.inner.insert_program(program).await
    }
    async fn find_program_for_job(&self, job_id: JobId) -> ShopStoreResult<Option<CuttingProgram>> {
        self.inner.find_program_for_job(job_id).await
    }
    async fn list_programs(&self, job_id: JobId) -> ShopStoreResult<Vec<CuttingProgram>> {
        self.inner.list_programs(job_id).await
    }
    async fn rename_program(
        &self,
        id: ProgramId,
        file_name: &ProgramFileName,
    ) -> ShopStoreResult<CuttingProgram> {
        self.inner.rename_program(id, file_name).await
    }
}

#[async_trait]
impl CuttingLogRepository for FaultyStore {
    async fn insert_log(&self, entry: &NewCuttingLogEntry) -> ShopStoreResult<CuttingLogEntry> {
        self.inner.insert_log(entry).await
    }
    async fn update_log(&self, update: &LogUpdate) -> ShopStoreResult<CuttingLogEntry> {
        self.inner.update_log(update).await
    }
    async fn latest_log(&self, program_id: ProgramId) -> ShopStoreResult<Option<CuttingLogEntry>> {
        self.inner.latest_log(program_id).await
    }
    async fn list_logs(&self, program_id: ProgramId) -> ShopStoreResult<Vec<CuttingLogEntry>> {
        self.inner.list_logs(program_id).await
    }
}
