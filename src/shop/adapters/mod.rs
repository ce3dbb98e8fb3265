//! Persistence adapters for the shop-floor ports.
//!
//! - [`memory::InMemoryShopStore`]: in-process store for tests and demos
//! - [`postgres::PostgresShopStore`]: Diesel-backed `PostgreSQL` store

pub mod memory;
pub mod postgres;
