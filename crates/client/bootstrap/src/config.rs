//! Client configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use client_blockchain_core::Address;
use runtime::{IdentityId, SessionIdentity};

/// Configuration required to bootstrap a client runtime and session.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Where statistics are stored. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub identity: Option<IdentityId>,
    pub wallet: Option<Address>,
    /// TOML dictionary replacing the built-in word list.
    pub dictionary: Option<PathBuf>,
    /// Rolling log directory. `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
    pub reconcile_queue_size: usize,
    pub auto_new_game: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            identity: None,
            wallet: None,
            dictionary: None,
            log_dir: None,
            reconcile_queue_size: Self::DEFAULT_RECONCILE_QUEUE_SIZE,
            auto_new_game: false,
        }
    }
}

impl AppConfig {
    pub const DEFAULT_RECONCILE_QUEUE_SIZE: usize = 16;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `WORDLE_DATA_DIR` - Storage directory (default: platform data dir)
    /// - `WORDLE_IDENTITY` - Numeric identity (default: anonymous)
    /// - `WORDLE_WALLET_ADDRESS` - Ledger account; enables reconciliation
    /// - `WORDLE_DICTIONARY` - Custom TOML dictionary
    /// - `WORDLE_LOG_DIR` - Rolling log directory (default: stderr)
    /// - `WORDLE_AUTO_NEW_GAME` - Start a new game after each finish (default: false)
    /// - `RECONCILE_QUEUE_SIZE` - Reconcile command buffer (default: 16)
    ///
    /// Ledger endpoints are read separately by `EvmConfig::from_env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(dir) = read("WORDLE_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = read("WORDLE_IDENTITY") {
            let id = raw
                .parse::<IdentityId>()
                .with_context(|| format!("WORDLE_IDENTITY must be a number, got {raw:?}"))?;
            config.identity = Some(id);
        }

        if let Some(raw) = read("WORDLE_WALLET_ADDRESS") {
            let address = raw
                .parse::<Address>()
                .with_context(|| format!("Invalid WORDLE_WALLET_ADDRESS {raw:?}"))?;
            config.wallet = Some(address);
        }

        config.dictionary = read("WORDLE_DICTIONARY").map(PathBuf::from);
        config.log_dir = read("WORDLE_LOG_DIR").map(PathBuf::from);

        if let Some(size) = read("RECONCILE_QUEUE_SIZE").and_then(|s| s.parse::<usize>().ok()) {
            config.reconcile_queue_size = size.max(1);
        }

        if let Some(enable) = read("WORDLE_AUTO_NEW_GAME").and_then(|s| s.parse::<bool>().ok()) {
            config.auto_new_game = enable;
        }

        Ok(config)
    }

    pub fn session_identity(&self) -> SessionIdentity {
        SessionIdentity::from_parts(self.identity, self.wallet)
    }

    /// Reconciliation needs both an identity and a wallet.
    pub fn reconciliation_enabled(&self) -> bool {
        self.session_identity().wallet().is_some()
    }
}

/// Platform data directory, e.g. `~/.local/share/wordle` on Linux.
pub fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "wordle").map(|dirs| dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_is_anonymous_and_offline() {
        let config = config(&[]).unwrap();
        assert_eq!(config.session_identity(), SessionIdentity::Anonymous);
        assert!(!config.reconciliation_enabled());
        assert_eq!(config.reconcile_queue_size, 16);
    }

    #[test]
    fn wallet_with_identity_enables_reconciliation() {
        let config = config(&[
            ("WORDLE_IDENTITY", "42"),
            ("WORDLE_WALLET_ADDRESS", "0x00000000000000000000000000000000000000aa"),
            ("RECONCILE_QUEUE_SIZE", "0"),
            ("WORDLE_DATA_DIR", "/tmp/wordle-test"),
        ])
        .unwrap();
        assert!(config.reconciliation_enabled());
        assert_eq!(config.session_identity().id(), Some(42));
        assert_eq!(config.reconcile_queue_size, 1);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/wordle-test")));
    }

    #[test]
    fn wallet_without_identity_stays_offline() {
        let config = config(&[(
            "WORDLE_WALLET_ADDRESS",
            "0x00000000000000000000000000000000000000aa",
        )])
        .unwrap();
        assert!(!config.reconciliation_enabled());
    }

    #[test]
    fn malformed_values_are_reported() {
        assert!(config(&[("WORDLE_IDENTITY", "alice")]).is_err());
        assert!(config(&[("WORDLE_WALLET_ADDRESS", "0x1234")]).is_err());
    }
}
