//! Article catalog management and the article picker search.

use super::ShopServiceResult;
use crate::remote::{DEFAULT_REMOTE_TIMEOUT, bounded};
use crate::shop::{
    domain::{Article, ArticleDraft, ArticleId, ArticleQuery, ArticleSearchField, ShopDomainError},
    ports::{ArticleRepository, ShopStoreError},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Shortest picker term that reaches the store.
pub const MIN_PICKER_TERM_CHARS: usize = 2;

/// Maximum number of picker suggestions.
pub const PICKER_LIMIT: usize = 20;

/// Quiet period before a picker search is sent.
pub const PICKER_DEBOUNCE: Duration = Duration::from_millis(300);

/// Article catalog service.
#[derive(Clone)]
pub struct ArticleCatalogService<S>
where
    S: ArticleRepository,
{
    store: Arc<S>,
    remote_timeout: Duration,
}

impl<S> ArticleCatalogService<S>
where
    S: ArticleRepository,
{
    /// Creates a new catalog service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self {
            store,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Sets the deadline applied to store calls.
    #[must_use]
    pub const fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    /// Adds an article after checking its number is free.
    ///
    /// # Errors
    ///
    /// Returns [`ShopDomainError::DuplicateArticleNumber`] (as
    /// [`super::ShopServiceError::Domain`]) when the number is taken, whether
    /// the check or the store's own constraint notices it.
    #[instrument(skip(self, draft), fields(article_num = %draft.article_num))]
    pub async fn create(&self, draft: &ArticleDraft) -> ShopServiceResult<Article> {
        self.ensure_number_free(draft, None).await?;
        let article = bounded(self.remote_timeout, self.store.insert_article(draft)).await?;
        info!(article_id = %article.id(), "article created");
        Ok(article)
    }

    /// Replaces an article's fields.
    ///
    /// The number check only runs when the number changes and ignores the
    /// article itself.
    ///
    /// # Errors
    ///
    /// Returns [`super::ShopServiceError::Domain`] for a taken number and
    /// [`super::ShopServiceError::Store`] when the article does not exist or
    /// the write fails.
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: ArticleId, draft: &ArticleDraft) -> ShopServiceResult<Article> {
        let current = bounded(self.remote_timeout, self.store.find_article(id))
            .await?
            .ok_or(ShopStoreError::ArticleNotFound(id))?;
        if current.article_num() != &draft.article_num {
            self.ensure_number_free(draft, Some(id)).await?;
        }
        let article = bounded(self.remote_timeout, self.store.update_article(id, draft)).await?;
        Ok(article)
    }

    /// Removes an article that no job uses.
    ///
    /// # Errors
    ///
    /// Returns [`ShopDomainError::ArticleInUse`] (as
    /// [`super::ShopServiceError::Domain`]) while job details reference it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: ArticleId) -> ShopServiceResult<()> {
        let usage = bounded(self.remote_timeout, self.store.count_article_usage(id)).await?;
        if usage > 0 {
            return Err(ShopDomainError::ArticleInUse(id).into());
        }
        bounded(self.remote_timeout, self.store.delete_article(id)).await?;
        info!(article_id = %id, "article deleted");
        Ok(())
    }

    /// Lists articles for the management table.
    ///
    /// # Errors
    ///
    /// Returns [`super::ShopServiceError::Store`] when the read fails.
    pub async fn list(&self, query: &ArticleQuery) -> ShopServiceResult<Vec<Article>> {
        let articles = bounded(self.remote_timeout, self.store.list_articles(query)).await?;
        Ok(articles)
    }

    /// Suggests articles whose name or number contains `term`.
    ///
    /// Terms shorter than [`MIN_PICKER_TERM_CHARS`] characters return
    /// nothing without querying the store.
    ///
    /// # Errors
    ///
    /// Returns [`super::ShopServiceError::Store`] when the read fails.
    pub async fn search_for_picker(&self, term: &str) -> ShopServiceResult<Vec<Article>> {
        let needle = term.trim();
        if needle.chars().count() < MIN_PICKER_TERM_CHARS {
            return Ok(Vec::new());
        }
        let query = ArticleQuery {
            search: Some((ArticleSearchField::NameOrNumber, needle.to_owned())),
            limit: Some(PICKER_LIMIT),
            ..ArticleQuery::default()
        };
        self.list(&query).await
    }

    async fn ensure_number_free(
        &self,
        draft: &ArticleDraft,
        except: Option<ArticleId>,
    ) -> ShopServiceResult<()> {
        let existing = bounded(
            self.remote_timeout,
            self.store.find_article_by_number(&draft.article_num),
        )
        .await?;
        match existing {
            Some(article) if Some(article.id()) != except => {
                Err(ShopDomainError::DuplicateArticleNumber(draft.article_num.clone()).into())
            }
            _ => Ok(()),
        }
    }
}

/// Debounces picker searches: only the latest call within the quiet period
/// reaches the store, and superseded calls resolve to `None`.
#[derive(Debug)]
pub struct ArticleSearchDebouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl ArticleSearchDebouncer {
    /// Creates a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Runs a debounced picker search.
    ///
    /// Short terms clear the suggestions at once and cancel any pending
    /// search. Returns `None` when a newer call superseded this one.
    ///
    /// # Errors
    ///
    /// Returns [`super::ShopServiceError::Store`] when the read fails.
    pub async fn search<S>(
        &self,
        catalog: &ArticleCatalogService<S>,
        term: &str,
    ) -> ShopServiceResult<Option<Vec<Article>>>
    where
        S: ArticleRepository,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst).wrapping_add(1);
        if term.trim().chars().count() < MIN_PICKER_TERM_CHARS {
            return Ok(Some(Vec::new()));
        }
        tokio::time::sleep(self.delay).await;
        if !self.is_current(ticket) {
            debug!("picker search superseded before sending");
            return Ok(None);
        }
        let found = catalog.search_for_picker(term).await?;
        Ok(self.is_current(ticket).then_some(found))
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }
}

impl Default for ArticleSearchDebouncer {
    fn default() -> Self {
        Self::new(PICKER_DEBOUNCE)
    }
}
