//! Common types for ledger interactions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::traits::LedgerError;

/// Largest number of games (wins + losses) the stats contract accepts in one
/// submission.
pub const MAX_BATCH_GAMES: u64 = 200;

/// 20-byte account address of a player on the ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Abbreviated form for display, e.g. `0x1234...abcd`.
    ///
    /// Returns the full address when it is shorter than `start + end`.
    pub fn short(&self, start: usize, end: usize) -> String {
        format_address(&self.to_string(), start, end)
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix("0x")
            .or_else(|| s.trim().strip_prefix("0X"))
            .ok_or_else(|| LedgerError::Config(format!("address must start with 0x: {s}")))?;

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| LedgerError::Config(format!("invalid address {s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short(6, 4))
    }
}

/// Shortens a hex string to `start` leading and `end` trailing characters.
pub fn format_address(address: &str, start: usize, end: usize) -> String {
    if address.len() < start + end || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..start], &address[address.len() - end..])
}

/// Generic transaction identifier (a 32-byte hash on EVM chains).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(pub Vec<u8>);

impl TransactionId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl FromStr for TransactionId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(digits)
            .map(Self)
            .map_err(|e| LedgerError::MalformedResponse(format!("invalid transaction id {s}: {e}")))
    }
}

impl TryFrom<String> for TransactionId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransactionId> for String {
    fn from(id: TransactionId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", format_address(&self.to_string(), 10, 4))
    }
}

/// Transaction status on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Broadcast, but confirmation was not observed before the deadline.
    Pending,

    /// Included and executed successfully with the required confirmations.
    Confirmed { block_height: u64 },

    /// Included but reverted by the contract.
    Failed { error: String },
}

/// Aggregate statistics the contract stores for one player.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStats {
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    /// Percentage (0..=100) derived from the contract's basis-point value.
    pub win_percentage: f64,
    /// Incremented by exactly one per accepted submission.
    pub nonce: u64,
    /// Unix seconds of the last accepted submission (0 if never).
    pub last_updated: u64,
}

/// Incremental update sent to the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaSubmission {
    pub delta_wins: u64,
    pub delta_losses: u64,
    /// The contract refuses the write unless this equals its current nonce.
    pub expected_nonce: u64,
}

impl DeltaSubmission {
    pub fn games(&self) -> u64 {
        self.delta_wins + self.delta_losses
    }
}

/// Outcome of a broadcast submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub transaction_id: TransactionId,
    pub status: TransactionStatus,
    pub gas_used: Option<u64>,
}

/// Gas cost estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasEstimate {
    /// Gas units, including any safety buffer.
    pub amount: u64,
    /// Unit label (e.g. "gas").
    pub unit: String,
}

/// Ledger-specific configuration.
///
/// This is a trait to allow different ledgers to provide their own config types.
pub trait BlockchainConfig: Send + Sync {
    /// Human-readable network name (e.g., "base-mainnet")
    fn network_name(&self) -> &str;

    /// RPC endpoint URL
    fn rpc_url(&self) -> &str;

    /// Validate configuration (e.g., URL format, contract address)
    fn validate(&self) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xbf0a43607795260b609e6e36d0fd526b3f112628";

    #[test]
    fn address_round_trips_through_text() {
        let address: Address = ADDR.parse().unwrap();
        assert_eq!(address.to_string(), ADDR);
        let upper: Address = "0xBF0A43607795260B609E6E36D0FD526B3F112628".parse().unwrap();
        assert_eq!(upper, address);
    }

    #[test]
    fn address_rejects_bad_input() {
        assert!("bf0a43607795260b609e6e36d0fd526b3f112628".parse::<Address>().is_err());
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzz0a43607795260b609e6e36d0fd526b3f112628".parse::<Address>().is_err());
    }

    #[test]
    fn short_address_format() {
        let address: Address = ADDR.parse().unwrap();
        assert_eq!(address.short(6, 4), "0xbf0a...2628");
        assert_eq!(format_address("0x12", 6, 4), "0x12");
    }

    #[test]
    fn transaction_id_serializes_as_hex_string() {
        let id = TransactionId::from_bytes(vec![0xab, 0xcd]);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"0xabcd\"");
        let back: TransactionId = serde_json::from_str("\"0xabcd\"").unwrap();
        assert_eq!(back, id);
    }
}
