//! Unified error types surfaced by the runtime API.
//!
//! Reconciliation failures are returned as values; none of them affect the
//! board or the local statistics.
use thiserror::Error;

use client_blockchain_core::{LedgerError, TransactionId};
use game_core::ErrorSeverity;

pub use crate::reconcile::DeltaError;
pub use crate::repository::RepositoryError;

use crate::identity::IdentityId;

pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Failures assembling or tearing down the [`Runtime`](crate::Runtime).
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires a key-value store")]
    MissingStore,

    #[error("runtime requires a word list")]
    MissingWordList,

    #[error("worker task failed: {0}")]
    WorkerJoin(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Validation(#[from] DeltaError),

    /// Nonce still mismatched after resynchronizing once.
    #[error("ledger nonce {ledger} does not match expected {expected}; retry later")]
    Desync { expected: u64, ledger: u64 },

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[source] LedgerError),

    /// The ledger executed or simulated the submission and refused it.
    #[error("submission rejected by ledger: {reason}")]
    RejectedByLedger {
        tx: Option<TransactionId>,
        reason: String,
    },

    #[error("a reconciliation for identity {0} is already in flight")]
    InFlight(IdentityId),

    #[error("session has no wallet; reconciliation disabled")]
    NoWallet,

    #[error("reconciliation worker is not running")]
    WorkerUnavailable,
}

impl ReconcileError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation(DeltaError::InvalidDelta { .. }) => ErrorSeverity::Internal,
            Self::Validation(_) | Self::NoWallet => ErrorSeverity::Validation,
            Self::Desync { .. }
            | Self::LedgerUnavailable(_)
            | Self::RejectedByLedger { .. }
            | Self::InFlight(_) => ErrorSeverity::Recoverable,
            Self::WorkerUnavailable => ErrorSeverity::Internal,
        }
    }
}

impl From<LedgerError> for ReconcileError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::Rejected(reason) => Self::RejectedByLedger { tx: None, reason },
            other => Self::LedgerUnavailable(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities() {
        assert_eq!(
            ReconcileError::from(DeltaError::NothingToSubmit).severity(),
            ErrorSeverity::Validation
        );
        assert_eq!(
            ReconcileError::from(DeltaError::InvalidDelta { wins: -1, losses: 0 }).severity(),
            ErrorSeverity::Internal
        );
        assert!(
            ReconcileError::Desync {
                expected: 5,
                ledger: 7
            }
            .severity()
            .is_recoverable()
        );
    }

    #[test]
    fn contract_rejection_is_not_unavailability() {
        let error = ReconcileError::from(LedgerError::Rejected("invalid nonce".into()));
        assert!(matches!(error, ReconcileError::RejectedByLedger { tx: None, .. }));
        let error = ReconcileError::from(LedgerError::Network("timeout".into()));
        assert!(matches!(error, ReconcileError::LedgerUnavailable(_)));
    }
}
