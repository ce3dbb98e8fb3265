//! Laser-cutting shop floor: jobs, bills of materials, programs and logs.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types and pure form reducers in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
