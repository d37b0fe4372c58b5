//! Repository layer for data that survives a reload.
//!
//! Everything is stored as JSON strings in a [`KeyValueStore`], partitioned
//! per identity:
//! - statistics, in-progress game, last-played marker ([`StatsStore`])
//! - the last-submitted ledger snapshot ([`SnapshotRepository`])

mod error;
mod file;
mod keys;
mod memory;
mod snapshot;
mod stats;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileKvStore;
pub use keys::{GAME_STATE_KEY, LAST_PLAYED_KEY, LAST_SUBMITTED_KEY, Partition, STATS_KEY};
pub use memory::InMemoryKvStore;
pub use snapshot::{LastSubmitted, SnapshotRepository};
pub use stats::StatsStore;
pub use traits::{KeyValueStore, WriteOp};
