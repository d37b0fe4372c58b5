//! Common error infrastructure for game-core.
//!
//! Guess validation failures are synchronous and never corrupt
//! [`GameState`](crate::GameState): a rejected guess leaves the board exactly
//! as it was.

use thiserror::Error;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Temporary conditions that may succeed on retry
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with the same input later.
    ///
    /// Examples: ledger temporarily unreachable
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: wrong guess length, word not in dictionary
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: regressed local statistics, unrecoverable nonce desync
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Reasons a guess can be refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GuessError {
    #[error("the game is already over")]
    GameOver,

    #[error("word must contain 5 letters, got {len}")]
    InvalidLength { len: usize },

    #[error("invalid character {0:?} in guess")]
    InvalidCharacter(char),

    #[error("word not found in dictionary: {0}")]
    UnknownWord(String),
}

impl GuessError {
    pub const fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }
}
