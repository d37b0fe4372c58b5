//! Dictionary loader.

use std::path::Path;

use serde::Deserialize;

use game_core::Word;

use crate::loaders::{LoadResult, read_file};
use crate::words::StaticWordList;

#[derive(Debug, Deserialize)]
struct DictionaryFile {
    dictionary: DictionarySection,
}

#[derive(Debug, Deserialize)]
struct DictionarySection {
    answers: Vec<String>,
    #[serde(default)]
    allowed: Vec<String>,
}

/// Loader for dictionaries stored as TOML:
///
/// ```toml
/// [dictionary]
/// answers = ["CRANE", "SLATE"]
/// allowed = ["XYLYL"]   # optional extra guesses, never chosen as targets
/// ```
pub struct DictionaryLoader;

impl DictionaryLoader {
    /// Load a dictionary from a TOML file.
    pub fn load(path: &Path) -> LoadResult<StaticWordList> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid dictionary {}: {}", path.display(), e))
    }

    /// Parse a dictionary from TOML text.
    ///
    /// Every entry must be a five-letter word and at least one answer is
    /// required.
    pub fn parse(content: &str) -> LoadResult<StaticWordList> {
        let file: DictionaryFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse dictionary TOML: {}", e))?;

        let answers = parse_words(&file.dictionary.answers)?;
        if answers.is_empty() {
            anyhow::bail!("dictionary has no answers");
        }
        let allowed = parse_words(&file.dictionary.allowed)?;

        Ok(StaticWordList::new(answers, allowed))
    }
}

fn parse_words(raw: &[String]) -> LoadResult<Vec<Word>> {
    raw.iter()
        .map(|w| Word::parse(w).map_err(|e| anyhow::anyhow!("{:?}: {}", w, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::WordList;
    use std::io::Write;

    #[test]
    fn loads_answers_and_allowed_words() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[dictionary]\nanswers = [\"crane\", \"SLATE\"]\nallowed = [\"xylyl\"]"
        )
        .unwrap();

        let words = DictionaryLoader::load(file.path()).unwrap();
        assert_eq!(words.answers().len(), 2);
        assert!(words.contains(&Word::parse("XYLYL").unwrap()));
    }

    #[test]
    fn rejects_malformed_entries() {
        let err = DictionaryLoader::parse("[dictionary]\nanswers = [\"CRANES\"]").unwrap_err();
        assert!(err.to_string().contains("CRANES"));
    }

    #[test]
    fn rejects_empty_answer_list() {
        assert!(DictionaryLoader::parse("[dictionary]\nanswers = []").is_err());
    }
}
