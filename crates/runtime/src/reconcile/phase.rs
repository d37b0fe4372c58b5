use std::fmt;

use serde::{Deserialize, Serialize};

/// Steps of one reconciliation attempt.
///
/// ```text
/// Idle -> ComputingDelta -> Validating -> NonceChecking -> Submitting -> Confirming -> Settled
///                 ^                            |                            |
///                 +-------- Resyncing <--------+          (any step) -> Failed
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePhase {
    #[default]
    Idle,
    ComputingDelta,
    Validating,
    NonceChecking,
    Resyncing,
    Submitting,
    Confirming,
    Settled,
    Failed,
}

impl ReconcilePhase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ComputingDelta => "computing_delta",
            Self::Validating => "validating",
            Self::NonceChecking => "nonce_checking",
            Self::Resyncing => "resyncing",
            Self::Submitting => "submitting",
            Self::Confirming => "confirming",
            Self::Settled => "settled",
            Self::Failed => "failed",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Failed)
    }
}

impl fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
