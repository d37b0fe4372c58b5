//! Reconcile worker that serializes ledger work per identity.
//!
//! Receives commands from [`ReconcileHandle`](crate::api::ReconcileHandle) and
//! runs each one on its own task so a slow confirmation never blocks another
//! identity. A second command for an identity that is already in flight is
//! refused with [`ReconcileError::InFlight`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, error};

use game_core::UserStats;

use crate::api::{ReconcileError, Result};
use crate::identity::{IdentityId, WalletBinding};
use crate::reconcile::{Hydration, ReconcileOutcome, ReconciliationEngine};

/// Commands that can be sent to the reconcile worker
pub enum Command {
    /// Submit everything played since the last snapshot.
    /// `reply` is optional; detached submissions report through events only.
    Submit {
        binding: WalletBinding,
        stats: UserStats,
        reply: Option<oneshot::Sender<Result<ReconcileOutcome>>>,
    },
    /// Read the ledger record and decide whether to adopt its totals.
    Hydrate {
        binding: WalletBinding,
        local: UserStats,
        reply: oneshot::Sender<Result<Hydration>>,
    },
}

impl Command {
    fn identity(&self) -> IdentityId {
        match self {
            Self::Submit { binding, .. } | Self::Hydrate { binding, .. } => binding.identity,
        }
    }

    fn refuse(self, error: ReconcileError) {
        let delivered = match self {
            Self::Submit { reply, .. } => reply.is_none_or(|reply| reply.send(Err(error)).is_ok()),
            Self::Hydrate { reply, .. } => reply.send(Err(error)).is_ok(),
        };
        if !delivered {
            debug!("Refusal reply channel closed (caller dropped)");
        }
    }
}

/// A finished task, carrying the reply so it is only sent once the identity
/// has been released.
enum Finished {
    Submit {
        result: Result<ReconcileOutcome>,
        reply: Option<oneshot::Sender<Result<ReconcileOutcome>>>,
    },
    Hydrate {
        result: Result<Hydration>,
        reply: oneshot::Sender<Result<Hydration>>,
    },
}

/// Background task that owns the in-flight set.
pub struct ReconcileWorker {
    engine: Arc<ReconciliationEngine>,
    command_rx: mpsc::Receiver<Command>,
    in_flight: HashSet<IdentityId>,
    /// Identity served by each running task, so a panicked task releases
    /// only its own identity.
    owners: HashMap<Id, IdentityId>,
    tasks: JoinSet<Finished>,
}

impl ReconcileWorker {
    pub fn new(engine: Arc<ReconciliationEngine>, command_rx: mpsc::Receiver<Command>) -> Self {
        Self {
            engine,
            command_rx,
            in_flight: HashSet::new(),
            owners: HashMap::new(),
            tasks: JoinSet::new(),
        }
    }

    /// Main worker loop.
    ///
    /// Exits once every handle is dropped and the running tasks finish.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                // Release finished identities before accepting new work.
                biased;

                Some(joined) = self.tasks.join_next_with_id(), if !self.tasks.is_empty() => {
                    self.on_task_finished(joined);
                }
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }

        while let Some(joined) = self.tasks.join_next_with_id().await {
            self.on_task_finished(joined);
        }
        debug!("Reconcile worker stopped");
    }

    fn release(&mut self, task: Id) {
        if let Some(identity) = self.owners.remove(&task) {
            self.in_flight.remove(&identity);
        }
    }

    fn on_task_finished(&mut self, joined: std::result::Result<(Id, Finished), JoinError>) {
        let delivered = match joined {
            Ok((task, Finished::Submit { result, reply })) => {
                self.release(task);
                reply.is_none_or(|reply| reply.send(result).is_ok())
            }
            Ok((task, Finished::Hydrate { result, reply })) => {
                self.release(task);
                reply.send(result).is_ok()
            }
            Err(e) => {
                error!("Reconcile task failed: {}", e);
                self.release(e.id());
                true
            }
        };
        if !delivered {
            debug!("Reconcile reply channel closed (caller dropped)");
        }
    }

    fn handle_command(&mut self, cmd: Command) {
        let identity = cmd.identity();
        if !self.in_flight.insert(identity) {
            debug!(identity, "Reconciliation already in flight; refusing");
            cmd.refuse(ReconcileError::InFlight(identity));
            return;
        }

        let engine = Arc::clone(&self.engine);
        let task = match cmd {
            Command::Submit {
                binding,
                stats,
                reply,
            } => {
                self.tasks.spawn(async move {
                    let result = engine.submit(&stats, &binding).await;
                    Finished::Submit { result, reply }
                })
            }
            Command::Hydrate {
                binding,
                local,
                reply,
            } => {
                self.tasks.spawn(async move {
                    let result = engine.hydrate(&binding, &local).await;
                    Finished::Hydrate { result, reply }
                })
            }
        };
        self.owners.insert(task.id(), identity);
    }
}
