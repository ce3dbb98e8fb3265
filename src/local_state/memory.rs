//! In-memory local state for tests.

use super::{LocalKey, LocalStateError, LocalStateResult, LocalStateStore};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe map-backed local state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLocalState {
    entries: Arc<RwLock<HashMap<LocalKey, String>>>,
}

impl InMemoryLocalState {
    /// Creates empty local state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStateStore for InMemoryLocalState {
    fn read(&self, key: LocalKey) -> LocalStateResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|err| LocalStateError::storage(std::io::Error::other(err.to_string())))?;
        Ok(entries.get(&key).cloned())
    }

    fn write(&self, key: LocalKey, value: &str) -> LocalStateResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|err| LocalStateError::storage(std::io::Error::other(err.to_string())))?;
        entries.insert(key, value.to_owned());
        Ok(())
    }

    fn remove(&self, key: LocalKey) -> LocalStateResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|err| LocalStateError::storage(std::io::Error::other(err.to_string())))?;
        entries.remove(&key);
        Ok(())
    }
}
