//! Local statistics store.
//!
//! Every operation is scoped to a [`Partition`]. Storage failures are logged
//! and reported as `false`; they never propagate, so the caller's in-memory
//! copy stays authoritative for the rest of the session.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use game_core::{GameState, UserStats};

use super::keys::Partition;
use super::traits::{KeyValueStore, WriteOp};
use crate::identity::IdentityId;

#[derive(Clone)]
pub struct StatsStore {
    store: Arc<dyn KeyValueStore>,
}

impl StatsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read_raw(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Ignoring corrupted record {}: {}", key, e);
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let result = serde_json::to_string(value)
            .map_err(Into::into)
            .and_then(|json| self.store.set(key, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to persist {}: {}", key, e);
                false
            }
        }
    }

    fn apply(&self, ops: &[WriteOp], what: &str) -> bool {
        match self.store.apply(ops) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to {}: {}", what, e);
                false
            }
        }
    }

    /// Stats for `partition`, zeroed if nothing usable is stored.
    pub fn load(&self, partition: Partition) -> UserStats {
        let Some(mut stats) = self.read::<UserStats>(&partition.stats()) else {
            return UserStats::default();
        };

        if !stats.is_consistent() {
            tracing::warn!(
                ?partition,
                "Repairing inconsistent stats record (total {}, wins {}, losses {})",
                stats.total_games,
                stats.wins,
                stats.losses
            );
            stats.total_games = stats.wins + stats.losses;
            stats.max_streak = stats.max_streak.max(stats.current_streak);
        }
        stats
    }

    pub fn save(&self, partition: Partition, stats: &UserStats) -> bool {
        self.write(&partition.stats(), stats)
    }

    pub fn load_game_state(&self, partition: Partition) -> Option<GameState> {
        self.read(&partition.game_state())
    }

    pub fn save_game_state(&self, partition: Partition, state: &GameState) -> bool {
        self.write(&partition.game_state(), state)
    }

    pub fn clear_game_state(&self, partition: Partition) -> bool {
        self.apply(
            &[WriteOp::remove(partition.game_state())],
            "clear game state",
        )
    }

    pub fn mark_played(&self, partition: Partition) -> bool {
        self.mark_played_at(partition, Utc::now())
    }

    pub fn mark_played_at(&self, partition: Partition, at: DateTime<Utc>) -> bool {
        self.apply(
            &[WriteOp::set(partition.last_played(), at.to_rfc3339())],
            "record last played date",
        )
    }

    pub fn last_played(&self, partition: Partition) -> Option<DateTime<Utc>> {
        let raw = self.read_raw(&partition.last_played())?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .ok()
    }

    /// Whether the last finished game fell on today's local calendar date.
    pub fn played_today(&self, partition: Partition) -> bool {
        self.last_played(partition)
            .map(|t| t.with_timezone(&Local).date_naive() == Local::now().date_naive())
            .unwrap_or(false)
    }

    /// Clears stats, game state, last-played marker and ledger snapshot in
    /// one atomic write.
    pub fn reset(&self, partition: Partition) -> bool {
        let mut ops = vec![
            WriteOp::remove(partition.stats()),
            WriteOp::remove(partition.game_state()),
            WriteOp::remove(partition.last_played()),
        ];
        if let Some(snapshot) = partition.last_submitted() {
            ops.push(WriteOp::remove(snapshot));
        }
        let done = self.apply(&ops, "reset statistics");
        if done {
            tracing::info!(?partition, "Statistics reset");
        }
        done
    }

    /// Moves pre-identity records into `identity`'s partition.
    ///
    /// Does nothing unless the identity partition is empty and legacy stats
    /// exist. Returns whether a migration happened.
    pub fn migrate_legacy(&self, identity: IdentityId) -> bool {
        let target = Partition::Identity(identity);
        let legacy = Partition::Legacy;

        if self.read_raw(&target.stats()).is_some() || self.read_raw(&target.game_state()).is_some()
        {
            return false;
        }
        let Some(stats) = self.read_raw(&legacy.stats()) else {
            return false;
        };

        let mut ops = vec![WriteOp::set(target.stats(), stats)];
        if let Some(state) = self.read_raw(&legacy.game_state()) {
            ops.push(WriteOp::set(target.game_state(), state));
        }
        if let Some(played) = self.read_raw(&legacy.last_played()) {
            ops.push(WriteOp::set(target.last_played(), played));
        }
        ops.push(WriteOp::remove(legacy.stats()));
        ops.push(WriteOp::remove(legacy.game_state()));
        ops.push(WriteOp::remove(legacy.last_played()));

        let migrated = self.apply(&ops, "migrate legacy records");
        if migrated {
            tracing::info!(identity, "Migrated legacy statistics");
        }
        migrated
    }
}
