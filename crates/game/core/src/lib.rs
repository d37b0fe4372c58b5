//! Deterministic word-game rules and data types shared across clients.
//!
//! `game-core` defines the canonical rules (guess evaluation, board state,
//! statistics bookkeeping) and exposes pure APIs that can be reused by the
//! runtime and by offline tools. All board mutation flows through
//! [`GameState`]'s transition methods; persistence and ledger reconciliation
//! live in the `runtime` crate.
pub mod config;
pub mod error;
pub mod evaluate;
pub mod state;
pub mod traits;
pub mod word;

pub use config::{GameConfig, MAX_ATTEMPTS, WORD_LENGTH};
pub use error::{ErrorSeverity, GuessError};
pub use evaluate::{Evaluation, KeyboardHints, LetterState, evaluate_guess};
pub use state::{GameOutcome, GameState, GameStatus, GuessOutcome, Tile, UserStats};
pub use traits::WordList;
pub use word::Word;
