//! Last-submitted snapshot: the baseline for the next ledger delta.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use client_blockchain_core::{LedgerStats, TransactionId};

use super::error::Result;
use super::keys::Partition;
use super::traits::KeyValueStore;
use crate::identity::IdentityId;

/// What the device last sent (or believes it sent) to the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSubmitted {
    pub games: u64,
    pub wins: u64,
    pub losses: u64,
    /// Nonce the ledger is expected to hold now.
    pub nonce: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TransactionId>,
    /// Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Set while `tx_hash` was broadcast but never seen confirmed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

impl LastSubmitted {
    /// Baseline taken straight from the ledger's record.
    pub fn from_ledger(stats: &LedgerStats) -> Self {
        Self {
            games: stats.total_games,
            wins: stats.wins,
            losses: stats.losses,
            nonce: stats.nonce,
            tx_hash: None,
            timestamp: Some(Utc::now().timestamp_millis()),
            pending: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Snapshot persistence, owned by the reconciliation engine.
#[derive(Clone)]
pub struct SnapshotRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(identity: IdentityId) -> String {
        Partition::Identity(identity)
            .last_submitted()
            .unwrap_or_default()
    }

    /// Loads the snapshot. Unreadable records count as absent; the nonce
    /// check then forces a resync from the ledger.
    pub fn load(&self, identity: IdentityId) -> Option<LastSubmitted> {
        let key = Self::key(identity);
        let raw = match self.store.get(&key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Failed to read snapshot {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::error!("Corrupted snapshot {}: {}", key, e);
                None
            }
        }
    }

    pub fn save(&self, identity: IdentityId, snapshot: &LastSubmitted) -> Result<()> {
        let value = serde_json::to_string(snapshot)?;
        self.store.set(&Self::key(identity), &value)
    }

    pub fn clear(&self, identity: IdentityId) -> Result<()> {
        self.store.remove(&Self::key(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryKvStore;

    #[test]
    fn reads_records_written_by_older_clients() {
        let store = Arc::new(InMemoryKvStore::with_entries([(
            "wordle-last-submitted-9",
            r#"{"games":5,"wins":3,"losses":2,"nonce":5}"#,
        )]));
        let snapshots = SnapshotRepository::new(store);
        let snapshot = snapshots.load(9).unwrap();
        assert_eq!(snapshot.wins, 3);
        assert_eq!(snapshot.nonce, 5);
        assert!(!snapshot.is_pending());
        assert_eq!(snapshots.load(10), None);
    }

    #[test]
    fn save_then_load() {
        let snapshots = SnapshotRepository::new(Arc::new(InMemoryKvStore::new()));
        let snapshot = LastSubmitted {
            games: 7,
            wins: 5,
            losses: 2,
            nonce: 6,
            tx_hash: Some(TransactionId::from_bytes(vec![0xaa; 32])),
            timestamp: Some(1_700_000_000_000),
            pending: true,
        };
        snapshots.save(1, &snapshot).unwrap();
        assert_eq!(snapshots.load(1), Some(snapshot.clone()));
        assert!(snapshots.load(1).unwrap().is_pending());
        snapshots.clear(1).unwrap();
        assert_eq!(snapshots.load(1), None);
    }

    #[test]
    fn corrupted_snapshot_is_treated_as_missing() {
        let store = Arc::new(InMemoryKvStore::with_entries([(
            "wordle-last-submitted-2",
            "{broken",
        )]));
        assert_eq!(SnapshotRepository::new(store).load(2), None);
    }
}
