//! In-memory KeyValueStore implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::{RepositoryError, Result};
use super::traits::{KeyValueStore, WriteOp};

/// In-memory implementation of KeyValueStore.
///
/// Writes can be switched off to exercise storage-failure paths.
#[derive(Default)]
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
    reject_writes: AtomicBool,
}

impl InMemoryKvStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent write fail until switched back.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort_unstable();
        keys
    }

    fn check_writable(&self) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::WriteRejected("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn apply(&self, ops: &[WriteOp]) -> Result<()> {
        self.check_writable()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        for op in ops {
            match op {
                WriteOp::Set { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                WriteOp::Remove { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn rejected_writes_leave_contents_untouched() {
        let store = InMemoryKvStore::with_entries([("a", "1")]);
        store.reject_writes(true);
        assert!(store.set("a", "2").is_err());
        assert!(
            store
                .apply(&[WriteOp::remove("a"), WriteOp::set("b", "3")])
                .is_err()
        );
        assert_eq!(store.keys(), vec!["a".to_string()]);
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }
}
