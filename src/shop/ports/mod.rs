//! Port contracts for shop-floor persistence.

pub mod repository;

pub use repository::{
    ArticleRepository, CuttingLogRepository, JobDetailRepository, JobRepository,
    ProgramRepository, ShopStore, ShopStoreError, ShopStoreResult,
};
