//! JSON file adapter: Implementation of `UserRepository`.
//!
//! Persists all user records as a single JSON object keyed by username:
//!
//! ```json
//! {
//!   "alice": { "hash": "$argon2id$v=19$...", "role": "doctor" }
//! }
//! ```
//!
//! # Durability
//!
//! Every save rewrites the whole file. The new content is written to a
//! uniquely named sibling temp file, flushed, then renamed over the old file, so readers see
//! either the old or the new store and never a partial write. On Unix the file
//! is created with mode 0600.
//!
//! There is no cross-process locking: two processes saving at once follow
//! last-writer-wins.

use std::fs;
use std::io::{ErrorKind, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::domain::UserRecord;
use crate::ports::{UserRecords, UserRepository};

/// Error type for credential store I/O.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot access user store {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("User store {path:?} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("User store lock poisoned")]
    Poisoned,
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// User records stored in one JSON file.
#[derive(Debug, Clone)]
pub struct JsonUserFile {
    path: PathBuf,
}

impl JsonUserFile {
    /// Use the store at `path`. The file is created on first save.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory that holds the store and its temp files.
    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn write_atomically(&self, contents: &[u8]) -> Result<(), StoreError> {
        let dir = self.directory();
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        // Unique per writer, so concurrent saves never share a temp file.
        let mut tmp = tempfile::Builder::new()
            .prefix(".users-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| StoreError::io(dir, e))?;

        #[cfg(unix)]
        {
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| StoreError::io(tmp.path(), e))?;
        }

        tmp.write_all(contents)
            .and_then(|()| tmp.write_all(b"\n"))
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;

        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        Ok(())
    }
}

/// Attach each map key to its record's `username`.
fn with_usernames(mut records: UserRecords) -> UserRecords {
    for (name, record) in &mut records {
        record.username.clone_from(name);
    }
    records
}

impl UserRepository for JsonUserFile {
    type Error = StoreError;

    fn load(&self) -> Result<UserRecords, Self::Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("User store {:?} missing, starting empty", self.path);
                return Ok(UserRecords::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if text.trim().is_empty() {
            return Ok(UserRecords::new());
        }

        let records: UserRecords =
            serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!("Loaded {} user records from {:?}", records.len(), self.path);
        Ok(with_usernames(records))
    }

    fn save(&self, records: &UserRecords) -> Result<(), Self::Error> {
        let json = serde_json::to_string_pretty(records)?;
        self.write_atomically(json.as_bytes())?;
        tracing::debug!("Saved {} user records to {:?}", records.len(), self.path);
        Ok(())
    }
}

/// In-process user store (for tests and ephemeral sessions).
#[derive(Debug, Default)]
pub struct InMemoryUsers {
    records: Mutex<UserRecords>,
}

impl InMemoryUsers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with `records`.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.username.clone(), r))
            .collect();
        Self {
            records: Mutex::new(map),
        }
    }
}

impl UserRepository for InMemoryUsers {
    type Error = StoreError;

    fn load(&self) -> Result<UserRecords, Self::Error> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records.clone())
    }

    fn save(&self, records: &UserRecords) -> Result<(), Self::Error> {
        let mut stored = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        *stored = records.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use tempfile::tempdir;

    fn record(name: &str, hash: &str, role: Role) -> UserRecord {
        UserRecord::new(name, hash.to_string(), role)
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().expect("Should create temp dir");
        let store = JsonUserFile::new(dir.path().join("users.json"));
        assert!(store.load().expect("Should load").is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().expect("Should create temp dir");
        let store = JsonUserFile::new(dir.path().join("nested").join("users.json"));

        let mut records = UserRecords::new();
        records.insert("bob".into(), record("bob", "h-bob", Role::Viewer));
        records.insert("alice".into(), record("alice", "h-alice", Role::Doctor));
        store.save(&records).expect("Should save");

        let loaded = store.load().expect("Should load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["alice"].username, "alice");
        assert_eq!(loaded["alice"].password_hash, "h-alice");
        assert_eq!(loaded["alice"].role, Role::Doctor);
        let leftovers = fs::read_dir(dir.path().join("nested"))
            .expect("Should list")
            .count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_file_layout() {
        let dir = tempdir().expect("Should create temp dir");
        let path = dir.path().join("users.json");
        let store = JsonUserFile::new(&path);

        let mut records = UserRecords::new();
        records.insert("zed".into(), record("zed", "h1", Role::HealthWorker));
        records.insert("amy".into(), record("amy", "h2", Role::Viewer));
        store.save(&records).expect("Should save");

        let text = fs::read_to_string(&path).expect("Should read");
        // Sorted keys, two-space indentation, username only as the key.
        assert!(text.find("\"amy\"").expect("amy") < text.find("\"zed\"").expect("zed"));
        assert!(text.contains("\n  \"amy\": {\n    \"hash\": \"h2\""));
        assert!(text.contains("\"role\": \"health_worker\""));
        assert!(!text.contains("username"));
    }

    #[test]
    fn test_reads_minimal_legacy_layout() {
        let dir = tempdir().expect("Should create temp dir");
        let path = dir.path().join("users.json");
        fs::write(&path, r#"{"carol": {"hash": "abc123"}}"#).expect("Should write");

        let loaded = JsonUserFile::new(&path).load().expect("Should load");
        assert_eq!(loaded["carol"].username, "carol");
        assert_eq!(loaded["carol"].role, Role::Viewer);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().expect("Should create temp dir");
        let path = dir.path().join("users.json");
        fs::write(&path, "{ not json").expect("Should write");

        let err = JsonUserFile::new(&path).load().expect_err("Should fail");
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_store_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("Should create temp dir");
        let path = dir.path().join("users.json");
        JsonUserFile::new(&path)
            .save(&UserRecords::new())
            .expect("Should save");

        let mode = fs::metadata(&path).expect("Should stat").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_concurrent_writers_never_tear_the_store() {
        let dir = tempdir().expect("Should create temp dir");
        let path = dir.path().join("users.json");

        for round in 0..25 {
            let handles: Vec<_> = (0..4)
                .map(|writer| {
                    let path = path.clone();
                    std::thread::spawn(move || {
                        // Each writer has its own handle, like separate processes.
                        let store = JsonUserFile::new(&path);
                        let mut records = UserRecords::new();
                        for i in 0..20 {
                            let name = format!("w{writer}-u{i}");
                            records.insert(name.clone(), record(&name, &"ab".repeat(32), Role::Viewer));
                        }
                        store.save(&records)
                    })
                })
                .collect();
            for handle in handles {
                handle.join().expect("thread").expect("Should save");
            }

            let loaded = JsonUserFile::new(&path)
                .load()
                .unwrap_or_else(|e| panic!("store unreadable after round {round}: {e}"));
            assert_eq!(loaded.len(), 20);
        }

        let files = fs::read_dir(dir.path()).expect("Should list").count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_in_memory_roundtrip() {
        let store = InMemoryUsers::with_records([record("dan", "h", Role::Doctor)]);
        let mut records = store.load().expect("Should load");
        assert_eq!(records.len(), 1);

        records.insert("eve".into(), record("eve", "h2", Role::Viewer));
        store.save(&records).expect("Should save");
        assert_eq!(store.load().expect("Should load").len(), 2);
    }
}
