//! The article picker never reaches the store for terms shorter than two
//! characters.

use async_trait::async_trait;
use lasertrack::shop::{
    domain::{Article, ArticleDraft, ArticleId, ArticleNumber, ArticleQuery, ArticleSearchField},
    ports::{ArticleRepository, ShopStoreResult},
    services::{ArticleCatalogService, PICKER_LIMIT},
};
use mockall::mock;
use rstest::rstest;
use std::sync::Arc;

mock! {
    Catalog {}

    #[async_trait]
    impl ArticleRepository for Catalog {
        async fn insert_article(&self, draft: &ArticleDraft) -> ShopStoreResult<Article>;
        async fn update_article(&self, id: ArticleId, draft: &ArticleDraft) -> ShopStoreResult<Article>;
        async fn delete_article(&self, id: ArticleId) -> ShopStoreResult<()>;
        async fn find_article(&self, id: ArticleId) -> ShopStoreResult<Option<Article>>;
        async fn find_article_by_number(&self, number: &ArticleNumber) -> ShopStoreResult<Option<Article>>;
        async fn list_articles(&self, query: &ArticleQuery) -> ShopStoreResult<Vec<Article>>;
        async fn count_article_usage(&self, id: ArticleId) -> ShopStoreResult<u64>;
    }
}

#[rstest]
#[case("")]
#[case("b")]
#[case(" b ")]
#[tokio::test]
async fn short_terms_make_no_store_call(#[case] term: &str) {
    let mut store = MockCatalog::new();
    store.expect_list_articles().times(0);
    let catalog = ArticleCatalogService::new(Arc::new(store));

    let found = catalog.search_for_picker(term).await;

    assert!(matches!(found, Ok(articles) if articles.is_empty()));
}

#[tokio::test]
async fn two_characters_search_name_or_number_with_a_limit() {
    let mut store = MockCatalog::new();
    store
        .expect_list_articles()
        .withf(|query| {
            query.limit == Some(PICKER_LIMIT)
                && query.search == Some((ArticleSearchField::NameOrNumber, "br".to_owned()))
        })
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let catalog = ArticleCatalogService::new(Arc::new(store));

    let found = catalog.search_for_picker("br").await;

    assert!(matches!(found, Ok(articles) if articles.is_empty()));
}
