//! Service-level tests for the shop floor, run against the in-memory store.

mod execution_tests;
mod faulty_store;
