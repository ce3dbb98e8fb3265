//! Step definitions for operator job execution scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
