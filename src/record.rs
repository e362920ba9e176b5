//! Version record persistence
//!
//! The resolver writes a [Metadata] snapshot whenever it settles on a version
//! and reads it back only when source control cannot answer at all.

use crate::domain::Metadata;
use crate::error::{Result, TagVersionError};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence collaborator for version snapshots
pub trait RecordStore {
    /// Persist a snapshot, replacing any previous one
    fn write(&self, metadata: &Metadata) -> Result<()>;

    /// Load the last snapshot, `Ok(None)` when nothing was written yet
    fn read(&self) -> Result<Option<Metadata>>;
}

/// Pretty-printed JSON file holding `{version, commit, branch, timestamp}`
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonRecordStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonRecordStore {
    fn write(&self, metadata: &Metadata) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(metadata)?;
        fs::write(&self.path, json + "\n")?;
        tracing::debug!(path = %self.path.display(), version = %metadata.version, "wrote version record");
        Ok(())
    }

    fn read(&self) -> Result<Option<Metadata>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let metadata: Metadata = serde_json::from_str(&content).map_err(|e| {
            TagVersionError::record(format!(
                "Cannot parse version record '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(metadata))
    }
}

/// In-memory store, used where no record file should be touched
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    current: RefCell<Option<Metadata>>,
    writes: RefCell<usize>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a snapshot
    pub fn with_record(metadata: Metadata) -> Self {
        MemoryRecordStore {
            current: RefCell::new(Some(metadata)),
            writes: RefCell::new(0),
        }
    }

    /// Last snapshot written or seeded
    pub fn current(&self) -> Option<Metadata> {
        self.current.borrow().clone()
    }

    /// Number of `write` calls
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl RecordStore for MemoryRecordStore {
    fn write(&self, metadata: &Metadata) -> Result<()> {
        *self.current.borrow_mut() = Some(metadata.clone());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn read(&self) -> Result<Option<Metadata>> {
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Metadata {
        Metadata {
            version: "1.2.3".to_string(),
            commit: "abc1234".to_string(),
            branch: "main".to_string(),
            timestamp: "2024-05-01 12:00:00".to_string(),
        }
    }

    #[test]
    fn test_json_store_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path().join("version.json"));
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn test_json_store_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path().join("nested/pkg/version.json"));

        store.write(&sample()).unwrap();
        assert_eq!(store.read().unwrap(), Some(sample()));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"version\": \"1.2.3\""));
    }

    #[test]
    fn test_json_store_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("version.json");
        fs::write(&path, "{\"version\": ").unwrap();

        let err = JsonRecordStore::new(&path).read().unwrap_err();
        assert!(err.to_string().contains("Cannot parse version record"));
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryRecordStore::new();
        assert_eq!(store.read().unwrap(), None);

        store.write(&sample()).unwrap();
        store.write(&sample()).unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.current(), Some(sample()));
    }
}
