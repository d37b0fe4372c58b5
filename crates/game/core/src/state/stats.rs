/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum GameOutcome {
    Won,
    Lost,
}

/// Per-player statistics kept on the device.
///
/// Invariants: `total_games == wins + losses`, `max_streak >= current_streak`.
/// The win percentage is derived, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct UserStats {
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    pub current_streak: u64,
    pub max_streak: u64,
}

impl UserStats {
    /// Applies the result of one finished game.
    pub fn record(&mut self, outcome: GameOutcome) {
        self.total_games += 1;
        match outcome {
            GameOutcome::Won => {
                self.wins += 1;
                self.current_streak += 1;
                self.max_streak = self.max_streak.max(self.current_streak);
            }
            GameOutcome::Lost => {
                self.losses += 1;
                self.current_streak = 0;
            }
        }
    }

    /// `wins / total_games * 100`, or 0 before the first game.
    pub fn win_percentage(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            (self.wins as f64 / self.total_games as f64) * 100.0
        }
    }

    /// Replaces the win/loss counters with externally verified totals while
    /// keeping the streaks, which only the device tracks.
    pub fn adopt_totals(&mut self, wins: u64, losses: u64) {
        self.wins = wins;
        self.losses = losses;
        self.total_games = wins + losses;
    }

    pub fn is_consistent(&self) -> bool {
        self.total_games == self.wins + self.losses && self.max_streak >= self.current_streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaks_follow_results() {
        let mut stats = UserStats::default();
        stats.record(GameOutcome::Won);
        stats.record(GameOutcome::Won);
        stats.record(GameOutcome::Lost);
        stats.record(GameOutcome::Won);

        assert_eq!(stats.total_games, 4);
        assert_eq!(stats.wins, 3);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.max_streak, 2);
        assert!(stats.is_consistent());
    }

    #[test]
    fn win_percentage_matches_ratio() {
        assert_eq!(UserStats::default().win_percentage(), 0.0);
        for total in 1..=25u64 {
            for wins in 0..=total {
                let stats = UserStats {
                    total_games: total,
                    wins,
                    losses: total - wins,
                    ..Default::default()
                };
                assert_eq!(
                    stats.win_percentage(),
                    (wins as f64 / total as f64) * 100.0
                );
            }
        }
    }

    #[test]
    fn adopt_totals_keeps_streaks() {
        let mut stats = UserStats {
            total_games: 3,
            wins: 2,
            losses: 1,
            current_streak: 2,
            max_streak: 2,
        };
        stats.adopt_totals(10, 4);
        assert_eq!(stats.total_games, 14);
        assert_eq!(stats.current_streak, 2);
        assert!(stats.is_consistent());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_with_browser_field_names() {
        let stats = UserStats {
            total_games: 5,
            wins: 3,
            losses: 2,
            current_streak: 1,
            max_streak: 3,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"totalGames\":5"));
        assert!(json.contains("\"maxStreak\":3"));

        // Older records carry a stored winPercentage; it is ignored on read.
        let legacy = r#"{"totalGames":2,"wins":1,"losses":1,"winPercentage":50,
                        "currentStreak":0,"maxStreak":1}"#;
        let parsed: UserStats = serde_json::from_str(legacy).unwrap();
        assert_eq!(parsed.total_games, 2);
    }
}
