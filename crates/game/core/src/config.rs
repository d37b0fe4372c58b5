/// Number of letters in every guess and target word.
pub const WORD_LENGTH: usize = 5;

/// Maximum guesses per game.
pub const MAX_ATTEMPTS: usize = 6;

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Whether a finished game should immediately roll over into a new one.
    pub auto_new_game: bool,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    pub const WORD_LENGTH: usize = WORD_LENGTH;
    pub const MAX_ATTEMPTS: usize = MAX_ATTEMPTS;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_AUTO_NEW_GAME: bool = false;

    pub fn new() -> Self {
        Self {
            auto_new_game: Self::DEFAULT_AUTO_NEW_GAME,
        }
    }

    pub fn with_auto_new_game(auto_new_game: bool) -> Self {
        Self { auto_new_game }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
