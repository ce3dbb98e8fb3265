//! Local state kept as one JSON file per key in a capability-scoped
//! directory.

use super::{LocalKey, LocalStateError, LocalStateResult, LocalStateStore};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;

/// Directory-backed local state.
#[derive(Debug)]
pub struct DirectoryLocalState {
    dir: Dir,
}

impl DirectoryLocalState {
    /// Opens `path`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStateError::Storage`] when the directory cannot be
    /// created or opened.
    pub fn open(path: &Utf8Path) -> LocalStateResult<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(LocalStateError::storage)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(LocalStateError::storage)?;
        Ok(Self { dir })
    }

    fn file_name(key: LocalKey) -> String {
        format!("{}.json", key.as_str())
    }
}

impl LocalStateStore for DirectoryLocalState {
    fn read(&self, key: LocalKey) -> LocalStateResult<Option<String>> {
        match self.dir.read_to_string(Self::file_name(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(LocalStateError::storage(err)),
        }
    }

    fn write(&self, key: LocalKey, value: &str) -> LocalStateResult<()> {
        self.dir
            .write(Self::file_name(key), value)
            .map_err(LocalStateError::storage)
    }

    fn remove(&self, key: LocalKey) -> LocalStateResult<()> {
        match self.dir.remove_file(Self::file_name(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(LocalStateError::storage(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn temp_state() -> (tempfile::TempDir, DirectoryLocalState) {
        let temp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().join("state")).expect("utf-8 path");
        let state = DirectoryLocalState::open(&root).expect("open state dir");
        (temp, state)
    }

    #[test]
    fn values_persist_as_files() {
        let (temp, state) = temp_state();
        state.write(LocalKey::Authenticated, "true").expect("write");
        let on_disk = std::fs::read_to_string(temp.path().join("state/authenticated.json"))
            .expect("file written");
        assert_eq!(on_disk, "true");
        assert_eq!(
            state.read(LocalKey::Authenticated).expect("read").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn missing_keys_read_as_none_and_remove_cleanly() {
        let (_temp, state) = temp_state();
        assert_eq!(state.read(LocalKey::NotificationsCache).expect("read"), None);
        state.remove(LocalKey::NotificationsCache).expect("remove missing");
    }
}
