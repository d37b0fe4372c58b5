//! Authoritative game state representation.
//!
//! This module owns the board ([`GameState`]) and the per-player counters
//! ([`UserStats`]). Runtime layers persist and query these types but mutate
//! the board exclusively through its transition methods.
mod game;
mod stats;

pub use game::{GameState, GameStatus, GuessOutcome, Tile};
pub use stats::{GameOutcome, UserStats};
