//! High-level runtime orchestrator.
//!
//! The runtime owns the reconcile worker, wires up command/event channels,
//! and exposes a builder-based API for clients to open game sessions.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use client_blockchain_core::LedgerClient;
use game_core::{GameConfig, WordList};

use crate::api::{ReconcileHandle, RuntimeError};
use crate::events::EventBus;
use crate::identity::SessionIdentity;
use crate::reconcile::{ReconcileConfig, ReconciliationEngine};
use crate::repository::{KeyValueStore, SnapshotRepository, StatsStore};
use crate::session::GameSession;
use crate::workers::{Command, ReconcileWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub reconcile: ReconcileConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            reconcile: ReconcileConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 16,
        }
    }
}

/// Main runtime that hands out game sessions.
///
/// Without a ledger client no worker is started and every session plays
/// offline.
pub struct Runtime {
    config: RuntimeConfig,
    store: Arc<dyn KeyValueStore>,
    words: Arc<dyn WordList>,
    events: EventBus,

    reconciler: Option<ReconcileHandle>,
    reconcile_worker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Handle to the reconcile worker, if a ledger was configured.
    pub fn reconciler(&self) -> Option<ReconcileHandle> {
        self.reconciler.clone()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Opens a session for `identity`. Sessions with a wallet are wired to the
    /// reconcile worker.
    pub fn session(&self, identity: SessionIdentity) -> GameSession {
        let session = GameSession::start(
            identity,
            Arc::clone(&self.words),
            StatsStore::new(Arc::clone(&self.store)),
            self.events.clone(),
            self.config.game_config.clone(),
        );
        match (&self.reconciler, identity.wallet()) {
            (Some(reconciler), Some(_)) => session.with_reconciler(reconciler.clone()),
            _ => session,
        }
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits for in-flight submissions. Sessions hold handles to the worker
    /// and must be dropped first.
    pub async fn shutdown(self) -> Result<(), RuntimeError> {
        drop(self.reconciler);

        if let Some(handle) = self.reconcile_worker_handle {
            handle.await?;
        }
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    words: Option<Arc<dyn WordList>>,
    ledger: Option<Arc<dyn LedgerClient>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            store: None,
            words: None,
            ledger: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn words(mut self, words: Arc<dyn WordList>) -> Self {
        self.words = Some(words);
        self
    }

    /// Enables reconciliation against `ledger`.
    pub fn ledger(mut self, ledger: Arc<dyn LedgerClient>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Build the runtime
    ///
    /// Must be called inside a Tokio runtime when a ledger is configured.
    pub fn build(self) -> Result<Runtime, RuntimeError> {
        let store = self.store.ok_or(RuntimeError::MissingStore)?;
        let words = self.words.ok_or(RuntimeError::MissingWordList)?;
        let events = EventBus::with_capacity(self.config.event_buffer_size);

        let (reconciler, reconcile_worker_handle) = match self.ledger {
            Some(ledger) => {
                tracing::info!(
                    ledger = ledger.name(),
                    network = ledger.network(),
                    "Ledger reconciliation enabled"
                );
                let engine = ReconciliationEngine::new(
                    ledger,
                    SnapshotRepository::new(Arc::clone(&store)),
                    events.clone(),
                )
                .with_config(self.config.reconcile.clone());

                let (command_tx, command_rx) =
                    mpsc::channel::<Command>(self.config.command_buffer_size);
                let worker = ReconcileWorker::new(Arc::new(engine), command_rx);
                let handle = tokio::spawn(async move {
                    worker.run().await;
                });
                (
                    Some(ReconcileHandle::new(command_tx, events.clone())),
                    Some(handle),
                )
            }
            None => {
                tracing::info!("No ledger configured; playing offline");
                (None, None)
            }
        };

        Ok(Runtime {
            config: self.config,
            store,
            words,
            events,
            reconciler,
            reconcile_worker_handle,
        })
    }
}
