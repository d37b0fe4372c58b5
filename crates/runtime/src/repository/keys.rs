//! Storage key layout.
//!
//! Every record lives under a base key plus a partition suffix:
//!
//! ```text
//! wordle-stats            legacy (written before identities existed)
//! wordle-stats-temp       anonymous session
//! wordle-stats-{id}       identity {id}
//! ```

use crate::identity::IdentityId;

pub const GAME_STATE_KEY: &str = "wordle-game-state";
pub const STATS_KEY: &str = "wordle-stats";
pub const LAST_PLAYED_KEY: &str = "wordle-last-played";
pub const LAST_SUBMITTED_KEY: &str = "wordle-last-submitted";

/// Isolated slice of the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Unsuffixed keys from before identities were introduced.
    Legacy,
    /// Anonymous sessions. Never migrated.
    Temporary,
    Identity(IdentityId),
}

impl Partition {
    pub fn key(&self, base: &str) -> String {
        match self {
            Partition::Legacy => base.to_string(),
            Partition::Temporary => format!("{base}-temp"),
            Partition::Identity(id) => format!("{base}-{id}"),
        }
    }

    pub fn stats(&self) -> String {
        self.key(STATS_KEY)
    }

    pub fn game_state(&self) -> String {
        self.key(GAME_STATE_KEY)
    }

    pub fn last_played(&self) -> String {
        self.key(LAST_PLAYED_KEY)
    }

    /// Snapshots exist only for identities; other partitions have none.
    pub fn last_submitted(&self) -> Option<String> {
        match self {
            Partition::Identity(_) => Some(self.key(LAST_SUBMITTED_KEY)),
            _ => None,
        }
    }
}
