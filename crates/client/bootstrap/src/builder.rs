//! Builds the runtime, storage, word list and ledger used by front-ends.
use std::sync::Arc;

use anyhow::{Context, Result};

use client_blockchain_core::{BlockchainConfig, LedgerClient};
use client_blockchain_evm::{EvmConfig, EvmLedgerClient};
use game_content::{DictionaryLoader, StaticWordList};
use game_core::{GameConfig, WordList};
use runtime::{FileKvStore, InMemoryKvStore, KeyValueStore, Runtime, RuntimeConfig};

use crate::config::AppConfig;

/// Builder that assembles the runtime and its adapters for clients.
pub struct RuntimeBuilder {
    config: AppConfig,
    ledger: Option<Arc<dyn LedgerClient>>,
}

impl RuntimeBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ledger: None,
        }
    }

    /// Provide a ledger client instead of the EVM one built from the
    /// environment.
    pub fn ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn build(self) -> Result<RuntimeSetup> {
        let store = open_store(&self.config);
        let words = load_words(&self.config)?;

        let ledger = match self.ledger {
            Some(ledger) => Some(ledger),
            None if self.config.reconciliation_enabled() => connect_ledger(),
            None => {
                tracing::debug!("No wallet configured; reconciliation disabled");
                None
            }
        };

        let runtime_config = RuntimeConfig {
            game_config: GameConfig::with_auto_new_game(self.config.auto_new_game),
            command_buffer_size: self.config.reconcile_queue_size,
            ..RuntimeConfig::default()
        };

        let mut builder = Runtime::builder()
            .config(runtime_config)
            .store(store)
            .words(words);
        if let Some(ledger) = ledger {
            builder = builder.ledger(ledger);
        }
        let runtime = builder.build().context("Failed to build runtime")?;

        Ok(RuntimeSetup {
            config: self.config,
            runtime,
        })
    }
}

pub struct RuntimeSetup {
    pub config: AppConfig,
    pub runtime: Runtime,
}

/// File storage when a data directory is usable, memory otherwise.
fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let Some(dir) = &config.data_dir else {
        tracing::warn!("No data directory available; statistics will not survive a restart");
        return Arc::new(InMemoryKvStore::new());
    };

    match FileKvStore::open(dir) {
        Ok(store) => {
            tracing::info!("Storage: {}", store.path().display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to open storage in {}: {}. Falling back to memory.",
                dir.display(),
                e
            );
            Arc::new(InMemoryKvStore::new())
        }
    }
}

fn load_words(config: &AppConfig) -> Result<Arc<dyn WordList>> {
    let words = match &config.dictionary {
        Some(path) => DictionaryLoader::load(path)
            .with_context(|| format!("Failed to load dictionary {}", path.display()))?,
        None => StaticWordList::builtin(),
    };
    tracing::debug!("Dictionary: {} words", words.len());
    Ok(Arc::new(words))
}

/// Builds the EVM ledger client. Problems disable reconciliation instead of
/// failing startup; local play never depends on the ledger.
fn connect_ledger() -> Option<Arc<dyn LedgerClient>> {
    let config = match EvmConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ledger configuration invalid: {}. Continuing offline.", e);
            return None;
        }
    };
    if let Err(e) = config.validate() {
        tracing::warn!("Ledger configuration invalid: {}. Continuing offline.", e);
        return None;
    }

    match EvmLedgerClient::new(config) {
        Ok(client) => {
            if !client.can_submit() {
                tracing::warn!("LEDGER_WALLET_RPC_URL not set; submissions will fail");
            }
            tracing::info!("Ledger client initialized: network={}", client.network());
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!("Failed to initialize ledger client: {}. Continuing offline.", e);
            None
        }
    }
}
