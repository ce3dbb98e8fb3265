//! Shared notification feed with device-local read and hidden state.
//!
//! Notifications are written once to the shared store. Whether a user has
//! read or dismissed one is tracked only on their own device.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
