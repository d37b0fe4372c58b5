//! Delta between local statistics and the last submitted snapshot.

use thiserror::Error;

use game_core::UserStats;

use crate::repository::LastSubmitted;

/// Why a delta cannot be submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DeltaError {
    /// Local counters are behind the baseline.
    #[error("delta cannot be negative (wins {wins}, losses {losses})")]
    InvalidDelta { wins: i64, losses: i64 },

    #[error("nothing to submit")]
    NothingToSubmit,

    #[error("batch too large: {games} games exceeds the limit of {max}")]
    BatchTooLarge { games: u64, max: u64 },
}

/// Signed difference `local - baseline`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delta {
    pub wins: i64,
    pub losses: i64,
}

impl Delta {
    /// Computes the delta; a missing baseline counts as all zeros.
    pub fn between(local: &UserStats, baseline: Option<&LastSubmitted>) -> Self {
        let (base_wins, base_losses) = baseline.map(|b| (b.wins, b.losses)).unwrap_or((0, 0));
        Self {
            wins: signed_diff(local.wins, base_wins),
            losses: signed_diff(local.losses, base_losses),
        }
    }

    /// Checks the delta and returns `(wins, losses)` ready for submission.
    pub fn validate(&self, max_batch_games: u64) -> Result<(u64, u64), DeltaError> {
        if self.wins < 0 || self.losses < 0 {
            return Err(DeltaError::InvalidDelta {
                wins: self.wins,
                losses: self.losses,
            });
        }

        let (wins, losses) = (self.wins.unsigned_abs(), self.losses.unsigned_abs());
        let games = wins.saturating_add(losses);
        if games == 0 {
            return Err(DeltaError::NothingToSubmit);
        }
        if games > max_batch_games {
            return Err(DeltaError::BatchTooLarge {
                games,
                max: max_batch_games,
            });
        }
        Ok((wins, losses))
    }
}

fn signed_diff(local: u64, base: u64) -> i64 {
    if local >= base {
        i64::try_from(local - base).unwrap_or(i64::MAX)
    } else {
        i64::try_from(base - local).map(|d| -d).unwrap_or(i64::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(wins: u64, losses: u64) -> UserStats {
        UserStats {
            total_games: wins + losses,
            wins,
            losses,
            ..Default::default()
        }
    }

    fn snapshot(wins: u64, losses: u64, nonce: u64) -> LastSubmitted {
        LastSubmitted {
            games: wins + losses,
            wins,
            losses,
            nonce,
            ..Default::default()
        }
    }

    #[test]
    fn delta_from_snapshot() {
        let base = snapshot(3, 2, 5);
        let delta = Delta::between(&local(5, 2), Some(&base));
        assert_eq!(delta, Delta { wins: 2, losses: 0 });
        assert_eq!(delta.validate(200), Ok((2, 0)));
    }

    #[test]
    fn first_submission_sends_full_totals() {
        let delta = Delta::between(&local(1, 0), None);
        assert_eq!(delta.validate(200), Ok((1, 0)));
    }

    #[test]
    fn regression_is_rejected_not_clamped() {
        let base = snapshot(4, 2, 1);
        let delta = Delta::between(&local(3, 3), Some(&base));
        assert_eq!(
            delta.validate(200),
            Err(DeltaError::InvalidDelta { wins: -1, losses: 1 })
        );
    }

    #[test]
    fn empty_and_oversized_deltas() {
        let base = snapshot(3, 2, 1);
        assert_eq!(
            Delta::between(&local(3, 2), Some(&base)).validate(200),
            Err(DeltaError::NothingToSubmit)
        );
        assert_eq!(
            Delta::between(&local(150, 51), None).validate(200),
            Err(DeltaError::BatchTooLarge {
                games: 201,
                max: 200
            })
        );
        assert_eq!(Delta::between(&local(150, 50), None).validate(200), Ok((150, 50)));
    }
}
