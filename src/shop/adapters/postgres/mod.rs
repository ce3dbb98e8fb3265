//! `PostgreSQL` adapters for the shop-floor tables.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresShopStore, ShopPgPool, build_pool};
