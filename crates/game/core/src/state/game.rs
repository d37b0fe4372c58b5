use arrayvec::{ArrayString, ArrayVec};
use strum::Display;

use crate::config::{MAX_ATTEMPTS, WORD_LENGTH};
use crate::error::GuessError;
use crate::evaluate::{Evaluation, KeyboardHints, LetterState, evaluate_guess};
use crate::state::stats::GameOutcome;
use crate::traits::WordList;
use crate::word::Word;

/// Lifecycle of a single game. `Won` and `Lost` are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum GameStatus {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Playing)
    }

    pub const fn outcome(&self) -> Option<GameOutcome> {
        match self {
            Self::Playing => None,
            Self::Won => Some(GameOutcome::Won),
            Self::Lost => Some(GameOutcome::Lost),
        }
    }
}

/// In-progress game.
///
/// Invariants:
/// - at most [`MAX_ATTEMPTS`] guesses (enforced by the fixed-capacity vector)
/// - `status == Won` iff the last guess equals the target
/// - `status == Lost` iff all attempts are used and the game was not won
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct GameState {
    pub target_word: Word,
    pub current_guess: ArrayString<WORD_LENGTH>,
    /// Submitted guesses in attempt order.
    pub guesses: ArrayVec<Word, MAX_ATTEMPTS>,
    #[cfg_attr(feature = "serde", serde(rename = "gameStatus"))]
    pub status: GameStatus,
    #[cfg_attr(feature = "serde", serde(rename = "currentRow"))]
    pub current_row: usize,
}

/// Result of an accepted guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GuessOutcome {
    pub guess: Word,
    pub evaluation: Evaluation,
    /// Zero-based row the guess landed in.
    pub row: usize,
    /// Status after the guess.
    pub status: GameStatus,
}

/// One cell of the display grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub letter: Option<char>,
    pub state: LetterState,
}

impl Tile {
    const EMPTY: Tile = Tile {
        letter: None,
        state: LetterState::Empty,
    };
}

impl GameState {
    /// Creates a fresh game for `target_word`.
    pub fn new(target_word: Word) -> Self {
        Self {
            target_word,
            current_guess: ArrayString::new(),
            guesses: ArrayVec::new(),
            status: GameStatus::Playing,
            current_row: 0,
        }
    }

    /// Appends a letter to the guess being typed.
    ///
    /// Returns `false` (and leaves the state untouched) when the game is over,
    /// the row is full, or `letter` is not an ASCII letter.
    pub fn push_letter(&mut self, letter: char) -> bool {
        if self.status.is_terminal() || !letter.is_ascii_alphabetic() {
            return false;
        }
        self.current_guess
            .try_push(letter.to_ascii_uppercase())
            .is_ok()
    }

    /// Removes the last typed letter.
    pub fn pop_letter(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.current_guess.pop().is_some()
    }

    /// Submits the letters typed so far.
    pub fn submit_current(&mut self, words: &dyn WordList) -> Result<GuessOutcome, GuessError> {
        let typed = self.current_guess;
        self.submit_guess(&typed, words)
    }

    /// Validates and applies a guess.
    ///
    /// On error the state is unchanged. On success the guess is appended,
    /// the typing row is cleared, and the status advances to `Won` on an
    /// exact match or `Lost` when the final attempt misses.
    pub fn submit_guess(
        &mut self,
        raw: &str,
        words: &dyn WordList,
    ) -> Result<GuessOutcome, GuessError> {
        if self.status.is_terminal() {
            return Err(GuessError::GameOver);
        }

        let guess = Word::parse(raw)?;
        if !words.contains(&guess) {
            return Err(GuessError::UnknownWord(guess.to_string()));
        }

        let evaluation = evaluate_guess(&guess, &self.target_word);
        self.guesses
            .try_push(guess)
            .map_err(|_| GuessError::GameOver)?;

        let row = self.guesses.len() - 1;
        self.current_guess.clear();
        self.current_row = self.guesses.len();
        self.status = if guess == self.target_word {
            GameStatus::Won
        } else if self.guesses.is_full() {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        };

        Ok(GuessOutcome {
            guess,
            evaluation,
            row,
            status: self.status,
        })
    }

    /// Number of guesses made so far.
    pub fn attempts(&self) -> usize {
        self.guesses.len()
    }

    /// Checks the status invariants against the recorded guesses.
    ///
    /// Persisted state that fails this check is treated as corrupt.
    pub fn is_consistent(&self) -> bool {
        let won = self.guesses.last() == Some(&self.target_word);
        let expected = if won {
            GameStatus::Won
        } else if self.guesses.is_full() {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        };
        let target_only_last = self
            .guesses
            .iter()
            .rev()
            .skip(1)
            .all(|g| *g != self.target_word);

        self.status == expected && target_only_last && self.current_row == self.guesses.len()
    }

    /// Keyboard hints aggregated over all submitted guesses.
    pub fn keyboard_hints(&self) -> KeyboardHints {
        KeyboardHints::from_guesses(&self.guesses, &self.target_word)
    }

    /// Display grid: evaluated guesses, the typing row while playing, then
    /// empty rows up to [`MAX_ATTEMPTS`].
    pub fn board(&self) -> Vec<[Tile; WORD_LENGTH]> {
        let mut rows = Vec::with_capacity(MAX_ATTEMPTS);

        for guess in &self.guesses {
            let evaluation = evaluate_guess(guess, &self.target_word);
            let mut row = [Tile::EMPTY; WORD_LENGTH];
            for (i, tile) in row.iter_mut().enumerate() {
                *tile = Tile {
                    letter: Some(guess.letter(i)),
                    state: evaluation[i],
                };
            }
            rows.push(row);
        }

        if self.status == GameStatus::Playing {
            let mut row = [Tile::EMPTY; WORD_LENGTH];
            for (tile, letter) in row.iter_mut().zip(self.current_guess.chars()) {
                tile.letter = Some(letter);
            }
            rows.push(row);
        }

        while rows.len() < MAX_ATTEMPTS {
            rows.push([Tile::EMPTY; WORD_LENGTH]);
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dictionary(Vec<Word>);

    impl Dictionary {
        fn of(words: &[&str]) -> Self {
            Self(words.iter().map(|w| Word::parse(w).unwrap()).collect())
        }
    }

    impl WordList for Dictionary {
        fn random_word(&self) -> Word {
            self.0[0]
        }

        fn contains(&self, word: &Word) -> bool {
            self.0.contains(word)
        }

        fn len(&self) -> usize {
            self.0.len()
        }
    }

    fn dictionary() -> Dictionary {
        Dictionary::of(&[
            "CRANE", "TRACE", "SLATE", "ROUND", "PIOUS", "LIGHT", "MOUSE",
        ])
    }

    fn game() -> GameState {
        GameState::new(Word::parse("CRANE").unwrap())
    }

    #[test]
    fn winning_guess_finishes_the_game() {
        let words = dictionary();
        let mut state = game();

        let first = state.submit_guess("trace", &words).unwrap();
        assert_eq!(first.status, GameStatus::Playing);
        assert_eq!(first.row, 0);

        let second = state.submit_guess("CRANE", &words).unwrap();
        assert_eq!(second.status, GameStatus::Won);
        assert_eq!(second.row, 1);
        assert_eq!(state.current_row, 2);
        assert!(state.is_consistent());
        assert_eq!(state.submit_guess("SLATE", &words), Err(GuessError::GameOver));
    }

    #[test]
    fn sixth_miss_loses_and_no_seventh_guess_is_recorded() {
        let words = dictionary();
        let mut state = game();
        for guess in ["TRACE", "SLATE", "ROUND", "PIOUS", "LIGHT"] {
            assert_eq!(
                state.submit_guess(guess, &words).unwrap().status,
                GameStatus::Playing
            );
        }
        let last = state.submit_guess("MOUSE", &words).unwrap();
        assert_eq!(last.status, GameStatus::Lost);
        assert_eq!(state.attempts(), MAX_ATTEMPTS);

        assert_eq!(state.submit_guess("CRANE", &words), Err(GuessError::GameOver));
        assert_eq!(state.attempts(), MAX_ATTEMPTS);
        assert!(state.is_consistent());
    }

    #[test]
    fn rejected_guess_leaves_state_unchanged() {
        let words = dictionary();
        let mut state = game();
        for c in "QUIRK".chars() {
            assert!(state.push_letter(c));
        }
        let before = state.clone();

        assert_eq!(
            state.submit_current(&words),
            Err(GuessError::UnknownWord("QUIRK".into()))
        );
        assert_eq!(state, before);

        assert_eq!(
            state.submit_guess("CRAN", &words),
            Err(GuessError::InvalidLength { len: 4 })
        );
        assert_eq!(state, before);
    }

    #[test]
    fn typing_row_is_bounded_and_uppercased() {
        let mut state = game();
        for c in "slates".chars() {
            state.push_letter(c);
        }
        assert_eq!(state.current_guess.as_str(), "SLATE");
        assert!(!state.push_letter('1'));
        assert!(state.pop_letter());
        assert_eq!(state.current_guess.as_str(), "SLAT");
    }

    #[test]
    fn board_always_has_six_rows() {
        let words = dictionary();
        let mut state = game();
        assert_eq!(state.board().len(), MAX_ATTEMPTS);

        state.submit_guess("TRACE", &words).unwrap();
        state.push_letter('s');
        let board = state.board();
        assert_eq!(board.len(), MAX_ATTEMPTS);
        assert_eq!(board[0][1].state, LetterState::Correct);
        assert_eq!(board[1][0].letter, Some('S'));
        assert_eq!(board[1][0].state, LetterState::Empty);
        assert_eq!(board[2][0], Tile::EMPTY);
    }

    #[test]
    fn inconsistent_status_is_detected() {
        let words = dictionary();
        let mut state = game();
        state.submit_guess("TRACE", &words).unwrap();
        state.status = GameStatus::Won;
        assert!(!state.is_consistent());
    }
}
