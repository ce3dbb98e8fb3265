//! Device-local key/value state.
//!
//! Holds what the browser kept in local storage: the read and hidden
//! notification id sets, the notification cache and the session flag.
//! Values are JSON documents stored under a fixed set of keys.

mod directory;
mod memory;

pub use directory::DirectoryLocalState;
pub use memory::InMemoryLocalState;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

/// Keys of the persisted local values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocalKey {
    /// Ids of notifications read on this device.
    ReadNotifications,
    /// Ids of notifications hidden on this device.
    HiddenNotifications,
    /// Last notification list fetched from the store.
    NotificationsCache,
    /// Whether the password gate was passed.
    Authenticated,
}

impl LocalKey {
    /// Every key, in a stable order.
    pub const ALL: [Self; 4] = [
        Self::ReadNotifications,
        Self::HiddenNotifications,
        Self::NotificationsCache,
        Self::Authenticated,
    ];

    /// Returns the storage name of the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadNotifications => "read_notifications",
            Self::HiddenNotifications => "hidden_notifications",
            Self::NotificationsCache => "notifications_cache",
            Self::Authenticated => "authenticated",
        }
    }
}

/// Result type for local state operations.
pub type LocalStateResult<T> = Result<T, LocalStateError>;

/// Errors returned by local state stores.
#[derive(Debug, Clone, Error)]
pub enum LocalStateError {
    /// A stored value could not be decoded or encoded.
    #[error("local value for {key} is malformed: {source}")]
    Malformed {
        /// Affected key.
        key: &'static str,
        /// Decoder error.
        source: Arc<serde_json::Error>,
    },

    /// Storage failure.
    #[error("local storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl LocalStateError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}

/// Raw key/value storage contract.
pub trait LocalStateStore: Send + Sync {
    /// Reads the raw value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStateError::Storage`] when the backend fails.
    fn read(&self, key: LocalKey) -> LocalStateResult<Option<String>>;

    /// Replaces the raw value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStateError::Storage`] when the backend fails.
    fn write(&self, key: LocalKey, value: &str) -> LocalStateResult<()>;

    /// Removes `key`; removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStateError::Storage`] when the backend fails.
    fn remove(&self, key: LocalKey) -> LocalStateResult<()>;
}

/// Reads and decodes a JSON value.
///
/// # Errors
///
/// Returns [`LocalStateError::Malformed`] when the stored text is not valid
/// JSON for `T`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn LocalStateStore,
    key: LocalKey,
) -> LocalStateResult<Option<T>> {
    store
        .read(key)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|err| LocalStateError::Malformed {
                key: key.as_str(),
                source: Arc::new(err),
            })
        })
        .transpose()
}

/// Encodes and writes a JSON value.
///
/// # Errors
///
/// Returns [`LocalStateError::Malformed`] when encoding fails or a storage
/// error from the backend.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn LocalStateStore,
    key: LocalKey,
    value: &T,
) -> LocalStateResult<()> {
    let raw = serde_json::to_string(value).map_err(|err| LocalStateError::Malformed {
        key: key.as_str(),
        source: Arc::new(err),
    })?;
    store.write(key, &raw)
}
