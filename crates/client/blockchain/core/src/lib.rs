//! Ledger abstraction layer for the stats contract.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: LedgerClient (composite trait)
//!          ├── StatsReader
//!          └── StatsSubmitter
//! ```
//!
//! The reconciliation runtime only depends on [`LedgerClient`]; concrete
//! backends (the EVM JSON-RPC client, the in-memory mock) live behind it.
//!
//! # Usage
//!
//! ```ignore
//! use client_blockchain_core::{DeltaSubmission, LedgerClient};
//!
//! async fn push(ledger: &dyn LedgerClient, player: &Address) {
//!     let nonce = ledger.read_nonce(player).await?;
//!     let delta = DeltaSubmission { delta_wins: 2, delta_losses: 0, expected_nonce: nonce };
//!     let receipt = ledger.submit_delta(player, &delta).await?;
//! }
//! ```

pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use traits::{LedgerClient, LedgerError, StatsReader, StatsSubmitter};

pub use types::{
    format_address, Address, BlockchainConfig, DeltaSubmission, GasEstimate, LedgerStats,
    SubmissionReceipt, TransactionId, TransactionStatus, MAX_BATCH_GAMES,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockLedger, ScriptedSubmission};
