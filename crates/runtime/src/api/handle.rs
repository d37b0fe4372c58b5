//! Cloneable façade for issuing commands to the reconcile worker.
//!
//! [`ReconcileHandle`] hides channel plumbing and offers async helpers for
//! submitting statistics or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::sync::mpsc::error::TrySendError;

use game_core::UserStats;

use super::errors::{ReconcileError, Result};
use crate::events::{Event, EventBus, Topic};
use crate::identity::WalletBinding;
use crate::reconcile::{Hydration, ReconcileOutcome};
use crate::workers::Command;

/// Client-facing handle to the reconcile worker
#[derive(Clone)]
pub struct ReconcileHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl ReconcileHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Submit local statistics and wait for the attempt to finish.
    pub async fn submit(&self, binding: WalletBinding, stats: UserStats) -> Result<ReconcileOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Submit {
                binding,
                stats,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| ReconcileError::WorkerUnavailable)?;

        reply_rx.await.map_err(|_| ReconcileError::WorkerUnavailable)?
    }

    /// Queue a submission without waiting. The result is only reported on
    /// [`Topic::Reconcile`].
    ///
    /// Fails immediately if the queue is full; the next finished game will
    /// carry these games along.
    pub fn submit_detached(&self, binding: WalletBinding, stats: UserStats) -> Result<()> {
        self.command_tx
            .try_send(Command::Submit {
                binding,
                stats,
                reply: None,
            })
            .map_err(|e| match e {
                TrySendError::Full(_) | TrySendError::Closed(_) => ReconcileError::WorkerUnavailable,
            })
    }

    /// Read the ledger for `binding` and compare it with `local`.
    pub async fn hydrate(&self, binding: WalletBinding, local: UserStats) -> Result<Hydration> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(Command::Hydrate {
                binding,
                local,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ReconcileError::WorkerUnavailable)?;

        reply_rx.await.map_err(|_| ReconcileError::WorkerUnavailable)?
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut rx = handle.subscribe(Topic::Reconcile);
    /// while let Ok(event) = rx.recv().await {
    ///     // Show sync progress
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
