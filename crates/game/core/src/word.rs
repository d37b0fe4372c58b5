//! Fixed-length uppercase word type.

use std::fmt;
use std::str::FromStr;

use crate::config::WORD_LENGTH;
use crate::error::GuessError;

/// A five-letter word over `A..=Z`.
///
/// Construction normalizes to uppercase, so two `Word`s compare equal exactly
/// when they spell the same word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Word([u8; WORD_LENGTH]);

impl Word {
    /// Builds a word from ASCII letters at compile time.
    ///
    /// Panics (during const evaluation) on a non-letter byte.
    pub const fn from_ascii(bytes: [u8; WORD_LENGTH]) -> Self {
        let mut letters = bytes;
        let mut i = 0;
        while i < WORD_LENGTH {
            assert!(bytes[i].is_ascii_alphabetic(), "word must be ASCII letters");
            letters[i] = bytes[i].to_ascii_uppercase();
            i += 1;
        }
        Self(letters)
    }

    /// Parses a word, accepting either case and surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, GuessError> {
        let trimmed = input.trim();
        let len = trimmed.chars().count();
        if len != WORD_LENGTH {
            return Err(GuessError::InvalidLength { len });
        }

        let mut letters = [0u8; WORD_LENGTH];
        for (slot, ch) in letters.iter_mut().zip(trimmed.chars()) {
            if !ch.is_ascii_alphabetic() {
                return Err(GuessError::InvalidCharacter(ch));
            }
            *slot = ch.to_ascii_uppercase() as u8;
        }
        Ok(Self(letters))
    }

    /// Letters as uppercase ASCII bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8; WORD_LENGTH] {
        &self.0
    }

    /// Letter at `index` as a `char`.
    #[inline]
    pub fn letter(&self, index: usize) -> char {
        self.0[index] as char
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().map(|&b| b as char)
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for Word {
    type Err = GuessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Word {
    type Error = GuessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.as_str().to_string()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let word = Word::parse("  crAne\n").unwrap();
        assert_eq!(word.as_str(), "CRANE");
        assert_eq!(word, "CRANE".parse().unwrap());
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!(
            Word::parse("CRAN"),
            Err(GuessError::InvalidLength { len: 4 })
        );
        assert_eq!(
            Word::parse("CRANES"),
            Err(GuessError::InvalidLength { len: 6 })
        );
        assert_eq!(Word::parse(""), Err(GuessError::InvalidLength { len: 0 }));
    }

    #[test]
    fn parse_rejects_non_letters() {
        assert_eq!(Word::parse("CR4NE"), Err(GuessError::InvalidCharacter('4')));
        assert_eq!(Word::parse("CRÄNE"), Err(GuessError::InvalidCharacter('Ä')));
    }
}
