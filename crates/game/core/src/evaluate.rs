//! Guess evaluation and keyboard hint aggregation.
//!
//! Evaluation is two-pass so repeated letters are scored against the actual
//! number of occurrences in the target:
//!
//! 1. Exact matches are marked [`LetterState::Correct`] and consume their
//!    target position.
//! 2. Every remaining guess position, left to right, consumes the first
//!    unconsumed target position holding the same letter and is marked
//!    [`LetterState::Present`]; if none is left it is [`LetterState::Absent`].
//!
//! Earlier guess positions therefore win ties for a scarce target letter.

use std::collections::BTreeMap;

use strum::{AsRefStr, Display};

use crate::config::WORD_LENGTH;
use crate::word::Word;

/// Classification of a single letter tile.
///
/// Variants are ordered by information priority (`Empty < Absent < Present <
/// Correct`), which is what keyboard hint aggregation relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LetterState {
    /// Not yet evaluated (typing row or unused row).
    Empty,
    Absent,
    Present,
    Correct,
}

/// Per-position classification of a guess.
pub type Evaluation = [LetterState; WORD_LENGTH];

/// Evaluates `guess` against `target`.
pub fn evaluate_guess(guess: &Word, target: &Word) -> Evaluation {
    let guess = guess.bytes();
    let target = target.bytes();

    let mut result = [LetterState::Absent; WORD_LENGTH];
    let mut consumed = [false; WORD_LENGTH];

    for i in 0..WORD_LENGTH {
        if guess[i] == target[i] {
            result[i] = LetterState::Correct;
            consumed[i] = true;
        }
    }

    for i in 0..WORD_LENGTH {
        if result[i] == LetterState::Correct {
            continue;
        }
        let hit = (0..WORD_LENGTH).find(|&j| !consumed[j] && target[j] == guess[i]);
        if let Some(j) = hit {
            result[i] = LetterState::Present;
            consumed[j] = true;
        }
    }

    result
}

/// Best-known classification of every letter guessed so far.
///
/// Letters never guessed are absent from the map ("unseen"). A letter's hint
/// only ever moves up the priority order, so a letter known `correct` is not
/// downgraded by an `absent` result at another position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyboardHints {
    letters: BTreeMap<char, LetterState>,
}

impl KeyboardHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds hints by evaluating each guess against `target`.
    pub fn from_guesses<'a>(guesses: impl IntoIterator<Item = &'a Word>, target: &Word) -> Self {
        let mut hints = Self::new();
        for guess in guesses {
            hints.record(guess, &evaluate_guess(guess, target));
        }
        hints
    }

    /// Merges one evaluated guess into the hints.
    pub fn record(&mut self, guess: &Word, evaluation: &Evaluation) {
        for (letter, &state) in guess.chars().zip(evaluation.iter()) {
            let entry = self.letters.entry(letter).or_insert(LetterState::Empty);
            if state > *entry {
                *entry = state;
            }
        }
    }

    /// Hint for `letter` (case-insensitive); `None` if never guessed.
    pub fn get(&self, letter: char) -> Option<LetterState> {
        self.letters.get(&letter.to_ascii_uppercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, LetterState)> + '_ {
        self.letters.iter().map(|(&c, &s)| (c, s))
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LetterState::{Absent, Correct, Present};

    fn word(s: &str) -> Word {
        Word::parse(s).unwrap()
    }

    #[test]
    fn exact_guess_is_all_correct() {
        for w in ["CRANE", "SPEED", "AAAAA", "LLAMA"] {
            assert_eq!(evaluate_guess(&word(w), &word(w)), [Correct; WORD_LENGTH]);
        }
    }

    #[test]
    fn trace_against_crane() {
        // T absent, R/A/E in place, C present from position 0.
        assert_eq!(
            evaluate_guess(&word("TRACE"), &word("CRANE")),
            [Absent, Correct, Correct, Present, Correct]
        );
    }

    #[test]
    fn single_target_letter_credits_earliest_guess_occurrence() {
        // One A in CRANE, two in ALPHA, neither at index 2.
        assert_eq!(
            evaluate_guess(&word("ALPHA"), &word("CRANE")),
            [Present, Absent, Absent, Absent, Absent]
        );
    }

    #[test]
    fn correct_match_consumes_the_only_occurrence() {
        // E at index 4 is correct; the other two Es have nothing left to match.
        assert_eq!(
            evaluate_guess(&word("EERIE"), &word("CRANE")),
            [Absent, Absent, Present, Absent, Correct]
        );
    }

    #[test]
    fn repeated_target_letters_can_each_be_claimed() {
        assert_eq!(
            evaluate_guess(&word("ERASE"), &word("SPEED")),
            [Present, Absent, Absent, Present, Present]
        );
    }

    #[test]
    fn evaluation_is_deterministic() {
        let (g, t) = (word("ROBOT"), word("FLOOR"));
        let first = evaluate_guess(&g, &t);
        for _ in 0..10 {
            assert_eq!(evaluate_guess(&g, &t), first);
        }
    }

    #[test]
    fn hints_never_downgrade() {
        let target = word("CRANE");
        let mut hints = KeyboardHints::new();
        // R correct at index 1.
        hints.record(&word("TRACE"), &evaluate_guess(&word("TRACE"), &target));
        assert_eq!(hints.get('r'), Some(Correct));
        // TERRY scores its second R absent.
        hints.record(&word("TERRY"), &evaluate_guess(&word("TERRY"), &target));
        assert_eq!(hints.get('R'), Some(Correct));
        assert_eq!(hints.get('T'), Some(Absent));
        assert_eq!(hints.get('Z'), None);
    }

    #[test]
    fn hints_upgrade_present_to_correct() {
        let target = word("CRANE");
        let hints = KeyboardHints::from_guesses([&word("ACRID"), &word("CRANE")], &target);
        assert_eq!(hints.get('A'), Some(Correct));
        assert_eq!(hints.get('D'), Some(Absent));
    }

    #[test]
    fn letter_state_labels() {
        assert_eq!(Correct.to_string(), "correct");
        assert_eq!(LetterState::Empty.as_ref(), "empty");
    }
}
