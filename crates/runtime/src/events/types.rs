//! Event types for different topics.

use serde::{Deserialize, Serialize};

use client_blockchain_core::TransactionId;
use game_core::{Evaluation, GameOutcome, GameStatus, UserStats, Word};

use crate::identity::IdentityId;
use crate::reconcile::ReconcilePhase;
use crate::repository::LastSubmitted;

/// Events related to the board and local statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameEvent {
    /// A fresh target was chosen.
    NewGame,

    /// A guess passed validation and was appended to the board.
    GuessAccepted {
        guess: Word,
        evaluation: Evaluation,
        row: usize,
        status: GameStatus,
    },

    /// The game reached a terminal status.
    GameFinished {
        outcome: GameOutcome,
        attempts: usize,
        target: Word,
    },

    /// Local statistics changed (game finished, hydration, reset).
    StatsUpdated { stats: UserStats },
}

/// Events related to ledger reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReconcileEvent {
    PhaseChanged {
        identity: IdentityId,
        phase: ReconcilePhase,
    },

    /// Submission confirmed; `snapshot` is the new baseline.
    Settled {
        identity: IdentityId,
        tx: TransactionId,
        snapshot: LastSubmitted,
    },

    /// Submission broadcast but its confirmation was not observed.
    Pending {
        identity: IdentityId,
        tx: TransactionId,
    },

    Failed {
        identity: IdentityId,
        error: String,
    },

    /// Ledger record read at session start.
    Hydrated {
        identity: IdentityId,
        adopted_ledger_totals: bool,
    },
}
