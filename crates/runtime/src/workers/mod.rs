//! Worker tasks that back the runtime orchestration.
//!
//! The reconcile worker runs ledger submissions off the gameplay path.

mod reconcile;

pub use reconcile::{Command, ReconcileWorker};
