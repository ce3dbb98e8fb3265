//! Deadline handling for calls to the remote store.
//!
//! Every port error type converts from [`RemoteTimeout`], so services wrap a
//! store future with [`bounded`] and propagate the expiry with `?` like any
//! other store failure.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Default deadline for a single remote call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// A remote call exceeded its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("remote call timed out after {0:?}")]
pub struct RemoteTimeout(Duration);

impl RemoteTimeout {
    /// Returns the deadline that expired.
    #[must_use]
    pub const fn after(self) -> Duration {
        self.0
    }
}

/// Runs `call` with a deadline, mapping expiry into the call's error type.
///
/// # Errors
///
/// Returns the call's own error, or `E::from(RemoteTimeout)` when `limit`
/// elapses first.
pub async fn bounded<T, E, F>(limit: Duration, call: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<RemoteTimeout>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis(), "remote call timed out");
            Err(E::from(RemoteTimeout(limit)))
        }
    }
}
