//! Ledger reconciliation: pushes locally recorded games to the stats ledger
//! as nonce-guarded deltas.

mod delta;
mod engine;
mod phase;

pub use delta::{Delta, DeltaError};
pub use engine::{Hydration, ReconcileConfig, ReconcileOutcome, ReconciliationEngine};
pub use phase::ReconcilePhase;
