//! In-memory dictionary backed by a fixed word set.

use std::collections::HashSet;

use rand::seq::SliceRandom;

use game_core::{Word, WordList};

const BUILTIN_WORDS: &str = include_str!("../data/words.txt");

/// Target used if a hand-built list has no answers.
const FALLBACK_ANSWER: Word = Word::from_ascii(*b"CRANE");

/// Dictionary with a list of possible answers and a set of accepted guesses.
///
/// Every answer is also an accepted guess.
#[derive(Clone, Debug)]
pub struct StaticWordList {
    answers: Vec<Word>,
    accepted: HashSet<Word>,
}

impl StaticWordList {
    /// The dictionary shipped with the game.
    pub fn builtin() -> Self {
        let answers = BUILTIN_WORDS
            .lines()
            .filter_map(|line| Word::parse(line).ok())
            .collect::<Vec<_>>();
        Self::new(answers, std::iter::empty())
    }

    /// Builds a dictionary; duplicate answers are collapsed.
    pub fn new(answers: impl IntoIterator<Item = Word>, extra: impl IntoIterator<Item = Word>) -> Self {
        let mut seen = HashSet::new();
        let answers: Vec<Word> = answers.into_iter().filter(|w| seen.insert(*w)).collect();
        let mut accepted = seen;
        accepted.extend(extra);
        Self { answers, accepted }
    }

    pub fn answers(&self) -> &[Word] {
        &self.answers
    }
}

impl Default for StaticWordList {
    fn default() -> Self {
        Self::builtin()
    }
}

impl WordList for StaticWordList {
    fn random_word(&self) -> Word {
        self.answers
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(FALLBACK_ANSWER)
    }

    fn contains(&self, word: &Word) -> bool {
        self.accepted.contains(word)
    }

    fn len(&self) -> usize {
        self.accepted.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_dictionary_is_well_formed() {
        let words = StaticWordList::builtin();
        assert!(words.answers().len() > 400);
        assert!(words.contains(&Word::parse("crane").unwrap()));
        assert!(words.contains(&Word::parse("TRACE").unwrap()));
        assert!(!words.contains(&Word::parse("ZZZZZ").unwrap()));
    }

    #[test]
    fn random_word_is_an_answer() {
        let words = StaticWordList::builtin();
        for _ in 0..20 {
            let word = words.random_word();
            assert!(words.answers().contains(&word));
        }
    }

    #[test]
    fn extra_words_are_guessable_but_never_chosen() {
        let answer = Word::parse("CRANE").unwrap();
        let extra = Word::parse("XYLYL").unwrap();
        let words = StaticWordList::new([answer, answer], [extra]);
        assert_eq!(words.answers(), &[answer]);
        assert!(words.contains(&extra));
        assert_eq!(words.random_word(), answer);
        assert_eq!(words.len(), 2);
    }
}
