//! Static content access consumed by the rules layer.

use crate::word::Word;

/// Fixed dictionary of playable words.
///
/// Implementations are static and side-effect free apart from the randomness
/// used to pick a target.
pub trait WordList: Send + Sync {
    /// Picks a target word for a new game.
    fn random_word(&self) -> Word;

    /// Whether `word` is an accepted guess.
    fn contains(&self, word: &Word) -> bool;

    /// Number of words in the dictionary.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
