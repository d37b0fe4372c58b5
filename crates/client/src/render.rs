//! Plain-text rendering of the board, keyboard and statistics.

use std::fmt::Write;

use game_core::{KeyboardHints, LetterState, Tile, UserStats, WORD_LENGTH};

const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// `[X]` correct, `(X)` present, ` X ` absent, ` _ ` empty cell.
fn tile(tile: &Tile) -> String {
    match (tile.letter, tile.state) {
        (None, _) => " _ ".to_string(),
        (Some(c), LetterState::Correct) => format!("[{c}]"),
        (Some(c), LetterState::Present) => format!("({c})"),
        (Some(c), LetterState::Absent) => format!(" {} ", c.to_ascii_lowercase()),
        (Some(c), LetterState::Empty) => format!(" {c} "),
    }
}

pub fn board(rows: &[[Tile; WORD_LENGTH]]) -> String {
    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row.iter().map(tile).collect();
        let _ = writeln!(out, "  {}", line.join(""));
    }
    out
}

/// Keyboard with each letter marked by its best known state.
pub fn keyboard(hints: &KeyboardHints) -> String {
    let mut out = String::new();
    for (indent, row) in KEYBOARD_ROWS.iter().enumerate() {
        let keys: Vec<String> = row
            .chars()
            .map(|c| match hints.get(c) {
                Some(LetterState::Correct) => format!("[{c}]"),
                Some(LetterState::Present) => format!("({c})"),
                Some(LetterState::Absent) => " · ".to_string(),
                _ => format!(" {c} "),
            })
            .collect();
        let _ = writeln!(out, "  {}{}", " ".repeat(indent), keys.join(""));
    }
    out
}

pub fn stats(stats: &UserStats) -> String {
    format!(
        "Played {}  Wins {}  Losses {}  Win % {:.0}  Streak {}  Best {}",
        stats.total_games,
        stats.wins,
        stats.losses,
        stats.win_percentage(),
        stats.current_streak,
        stats.max_streak,
    )
}
