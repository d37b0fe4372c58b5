//! Static word content and loaders.
//!
//! This crate houses the playable dictionary and provides a loader for
//! custom dictionaries stored as TOML. Content is consumed by the runtime
//! through [`game_core::WordList`] and never appears in persisted state beyond
//! the chosen target word.

pub mod words;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use words::StaticWordList;

#[cfg(feature = "loaders")]
pub use loaders::DictionaryLoader;
