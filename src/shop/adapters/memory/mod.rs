//! In-memory adapters for the shop-floor tables.

mod store;

pub use store::InMemoryShopStore;
