//! ABI encoding for the stats contract.
//!
//! ```text
//! getStats(address)            -> (uint256 totalGames, uint256 wins, uint256 losses,
//!                                  uint64 lastUpdated, uint64 nonce)
//! getNonce(address)            -> uint64
//! getWinPercentage(address)    -> uint256 (basis points, 10000 = 100%)
//! submitStatsSnapshot(uint256 deltaWins, uint256 deltaLosses, uint64 expectedNonce)
//! ```

use client_blockchain_core::{Address, DeltaSubmission, LedgerError, LedgerStats};

const WORD: usize = 32;

pub const GET_STATS: [u8; 4] = [0xc2, 0x3f, 0x85, 0xd6];
pub const GET_NONCE: [u8; 4] = [0x2d, 0x03, 0x35, 0xab];
pub const GET_WIN_PERCENTAGE: [u8; 4] = [0x09, 0xb3, 0xeb, 0xdd];
pub const SUBMIT_STATS_SNAPSHOT: [u8; 4] = [0xf1, 0x18, 0xf3, 0x1f];

fn encode_address(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn encode_u64(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn calldata(selector: [u8; 4], args: &[[u8; WORD]]) -> String {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector);
    for arg in args {
        data.extend_from_slice(arg);
    }
    format!("0x{}", hex::encode(data))
}

pub fn get_stats(player: &Address) -> String {
    calldata(GET_STATS, &[encode_address(player)])
}

pub fn get_nonce(player: &Address) -> String {
    calldata(GET_NONCE, &[encode_address(player)])
}

pub fn get_win_percentage(player: &Address) -> String {
    calldata(GET_WIN_PERCENTAGE, &[encode_address(player)])
}

pub fn submit_stats_snapshot(delta: &DeltaSubmission) -> String {
    calldata(
        SUBMIT_STATS_SNAPSHOT,
        &[
            encode_u64(delta.delta_wins),
            encode_u64(delta.delta_losses),
            encode_u64(delta.expected_nonce),
        ],
    )
}

/// Splits ABI return data into 32-byte words.
fn words(data: &str) -> Result<Vec<[u8; WORD]>, LedgerError> {
    let raw = hex::decode(data.strip_prefix("0x").unwrap_or(data))
        .map_err(|e| LedgerError::MalformedResponse(format!("return data is not hex: {e}")))?;
    if raw.len() % WORD != 0 {
        return Err(LedgerError::MalformedResponse(format!(
            "return data length {} is not a multiple of {WORD}",
            raw.len()
        )));
    }
    Ok(raw
        .chunks_exact(WORD)
        .map(|chunk| {
            let mut word = [0u8; WORD];
            word.copy_from_slice(chunk);
            word
        })
        .collect())
}

fn word_to_u64(word: &[u8; WORD]) -> Result<u64, LedgerError> {
    if word[..24].iter().any(|&b| b != 0) {
        return Err(LedgerError::MalformedResponse(
            "value does not fit in 64 bits".to_string(),
        ));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&word[24..]);
    Ok(u64::from_be_bytes(bytes))
}

fn expect_words(data: &str, count: usize) -> Result<Vec<[u8; WORD]>, LedgerError> {
    let words = words(data)?;
    if words.len() < count {
        return Err(LedgerError::MalformedResponse(format!(
            "expected {count} return words, got {}",
            words.len()
        )));
    }
    Ok(words)
}

/// Decodes `getStats`; `win_percentage` is left at zero.
pub fn decode_stats(data: &str) -> Result<LedgerStats, LedgerError> {
    let words = expect_words(data, 5)?;
    Ok(LedgerStats {
        total_games: word_to_u64(&words[0])?,
        wins: word_to_u64(&words[1])?,
        losses: word_to_u64(&words[2])?,
        last_updated: word_to_u64(&words[3])?,
        nonce: word_to_u64(&words[4])?,
        win_percentage: 0.0,
    })
}

pub fn decode_u64(data: &str) -> Result<u64, LedgerError> {
    word_to_u64(&expect_words(data, 1)?[0])
}

/// Decodes `getWinPercentage` into a percentage.
pub fn decode_win_percentage(data: &str) -> Result<f64, LedgerError> {
    Ok(decode_u64(data)? as f64 / 100.0)
}
