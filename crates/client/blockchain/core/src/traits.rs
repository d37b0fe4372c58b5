//! Ledger abstraction traits.
//!
//! This module defines a layered ledger abstraction:
//! - Layer 1: StatsReader, StatsSubmitter (stats domain)
//! - Layer 2: LedgerClient (composite trait)

use async_trait::async_trait;

use crate::types::{Address, DeltaSubmission, GasEstimate, LedgerStats, SubmissionReceipt};

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while talking to the ledger.
///
/// Anything returned as an error means no submission is known to have been
/// broadcast. A submission whose fate is unknown is reported through
/// [`crate::TransactionStatus::Pending`] instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Wrong network: expected chain {expected}, connected to {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("No contract deployed at {0}")]
    ContractMissing(Address),

    #[error("Transaction rejected by user")]
    UserRejected,

    #[error("Insufficient funds for gas")]
    InsufficientFunds,

    /// The contract refused the call during simulation (e.g. `INVALID_NONCE`).
    #[error("Rejected by contract: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend-specific error: {0}")]
    Backend(String),
}

impl LedgerError {
    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Backend(_))
    }
}

// ============================================================================
// Layer 1: Stats Domain Traits
// ============================================================================

/// Read-only access to a player's ledger record.
#[async_trait]
pub trait StatsReader: Send + Sync {
    /// Full record of a player. Unknown players read as all zeros.
    async fn read_stats(&self, player: &Address) -> Result<LedgerStats, LedgerError>;

    /// Current submission nonce of a player.
    async fn read_nonce(&self, player: &Address) -> Result<u64, LedgerError>;

    /// Win percentage (0..=100) as computed by the contract.
    async fn read_win_percentage(&self, player: &Address) -> Result<f64, LedgerError> {
        Ok(self.read_stats(player).await?.win_percentage)
    }
}

/// Submission of stats deltas.
#[async_trait]
pub trait StatsSubmitter: Send + Sync {
    /// Estimate gas for a submission, including any safety buffer.
    async fn estimate_submission_gas(
        &self,
        player: &Address,
        delta: &DeltaSubmission,
    ) -> Result<GasEstimate, LedgerError>;

    /// Broadcast a delta and wait for its fate.
    ///
    /// `Ok` means the transaction was broadcast; its status tells whether it
    /// was confirmed, reverted, or is still unresolved.
    async fn submit_delta(
        &self,
        player: &Address,
        delta: &DeltaSubmission,
    ) -> Result<SubmissionReceipt, LedgerError>;
}

// ============================================================================
// Layer 2: Composite Trait
// ============================================================================

/// Complete ledger client used by the reconciliation engine.
pub trait LedgerClient: StatsReader + StatsSubmitter + Send + Sync {
    /// Get the backend name (e.g., "evm", "mock").
    fn name(&self) -> &str;

    /// Get the network name (e.g., "base-mainnet", "local").
    fn network(&self) -> &str;
}
