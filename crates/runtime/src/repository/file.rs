//! File-based KeyValueStore implementation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::error::{RepositoryError, Result};
use super::traits::{KeyValueStore, WriteOp};

/// File-based implementation of KeyValueStore.
///
/// The whole store is one JSON object persisted at `{base_dir}/storage.json`.
/// Every write serializes the updated map to a temporary file and renames it
/// over the old one, so a crash never leaves a half-written store. The
/// in-memory copy is only updated after the rename succeeds.
pub struct FileKvStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileKvStore {
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open (or create) the store in `base_dir`.
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)?;
        let path = base_dir.join(Self::FILE_NAME);

        let entries = if path.exists() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes).map_err(|e| {
                RepositoryError::CorruptedData(format!("{}: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };

        tracing::debug!("Opened key-value store at {}", path.display());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(entries)?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    fn update(&self, ops: &[WriteOp]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let mut next = entries.clone();
        for op in ops {
            match op {
                WriteOp::Set { key, value } => {
                    next.insert(key.clone(), value.clone());
                }
                WriteOp::Remove { key } => {
                    next.remove(key);
                }
            }
        }

        if next == *entries {
            return Ok(());
        }

        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(&[WriteOp::set(key, value)])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(&[WriteOp::remove(key)])
    }

    fn apply(&self, ops: &[WriteOp]) -> Result<()> {
        self.update(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = FileKvStore::open(dir.path()).unwrap();
            store.set("wordle-stats-7", "{}").unwrap();
            store
                .apply(&[WriteOp::set("a", "1"), WriteOp::set("b", "2")])
                .unwrap();
            store.remove("a").unwrap();
        }

        let store = FileKvStore::open(dir.path()).unwrap();
        assert_eq!(store.get("wordle-stats-7").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
        assert!(!dir.path().join("storage.json.tmp").exists());
    }

    #[test]
    fn corrupted_file_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(FileKvStore::FILE_NAME), b"not json").unwrap();
        assert!(matches!(
            FileKvStore::open(dir.path()),
            Err(RepositoryError::CorruptedData(_))
        ));
    }
}
