//! Lasertrack: shop-floor tracking for laser-cutting jobs.
//!
//! Office staff submit cutting jobs built from a catalog of articles;
//! operators run each job's cutting program, record a cutting log and
//! report produced and rejected pieces; the journal shows the full history.
//! Notifications about new and finished jobs reach every device through a
//! polling tracker with per-device read and hidden state.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: Orchestration of domain rules over ports
//!
//! # Modules
//!
//! - [`shop`]: Jobs, articles, programs, cutting logs and the journal
//! - [`notification`]: Notification feed, tracker and poller
//! - [`local_state`]: Device-local key/value state
//! - [`session`]: Password gate and session lifetime
//! - [`navigation`]: Routes between views
//! - [`config`] and [`telemetry`]: Start-up settings and logging

pub mod config;
pub mod local_state;
pub mod navigation;
pub mod notification;
pub mod remote;
pub mod session;
pub mod shop;
pub mod telemetry;
