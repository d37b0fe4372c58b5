//! Runtime orchestration for the word game and its stats ledger.
//!
//! This crate wires together persistence, the game session controller, and
//! the reconciliation engine into a cohesive runtime API. Consumers embed
//! [`Runtime`] to open [`GameSession`]s, subscribe to events, and push
//! finished games to the ledger through [`ReconcileHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`session`] owns the board and local statistics
//! - [`reconcile`] computes and submits nonce-guarded ledger deltas
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`repository`] persists statistics, saved games and ledger snapshots
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod identity;
pub mod reconcile;
pub mod repository;
pub mod runtime;
pub mod session;

mod workers;

pub use api::{DeltaError, ReconcileError, ReconcileHandle, Result, RuntimeError};
pub use events::{Event, EventBus, GameEvent, ReconcileEvent, Topic};
pub use identity::{IdentityId, SessionIdentity, WalletBinding};
pub use reconcile::{
    Delta, Hydration, ReconcileConfig, ReconcileOutcome, ReconcilePhase, ReconciliationEngine,
};
pub use repository::{
    FileKvStore, InMemoryKvStore, KeyValueStore, LastSubmitted, Partition, RepositoryError,
    SnapshotRepository, StatsStore, WriteOp,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use session::GameSession;
