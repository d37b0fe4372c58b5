//! Reconciliation engine.
//!
//! Drives one submission through the phases in [`ReconcilePhase`]. The engine
//! owns the last-submitted snapshot and never touches local statistics; it
//! only reads them.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use client_blockchain_core::{
    DeltaSubmission, LedgerClient, MAX_BATCH_GAMES, TransactionId, TransactionStatus,
};
use game_core::UserStats;

use super::delta::Delta;
use super::phase::ReconcilePhase;
use crate::api::{ReconcileError, Result};
use crate::events::{Event, EventBus, ReconcileEvent};
use crate::identity::{IdentityId, WalletBinding};
use crate::repository::{LastSubmitted, SnapshotRepository};

/// Limits applied to every submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileConfig {
    pub max_batch_games: u64,
    /// Resynchronizations allowed per attempt before giving up with `Desync`.
    pub max_resync_attempts: u32,
}

impl ReconcileConfig {
    pub const MAX_BATCH_GAMES: u64 = MAX_BATCH_GAMES;
    pub const MAX_RESYNC_ATTEMPTS: u32 = 1;
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_batch_games: Self::MAX_BATCH_GAMES,
            max_resync_attempts: Self::MAX_RESYNC_ATTEMPTS,
        }
    }
}

/// Successful end of a submission. Failures are [`ReconcileError`]s.
#[derive(Clone, Debug, PartialEq)]
pub enum ReconcileOutcome {
    /// Confirmed by the ledger; `snapshot` is the new baseline.
    Settled {
        tx: TransactionId,
        submitted: DeltaSubmission,
        snapshot: LastSubmitted,
    },
    /// Broadcast, but confirmation was not observed. The snapshot was saved
    /// optimistically and marked pending.
    Pending {
        tx: TransactionId,
        submitted: DeltaSubmission,
    },
}

impl ReconcileOutcome {
    pub fn tx(&self) -> &TransactionId {
        match self {
            Self::Settled { tx, .. } | Self::Pending { tx, .. } => tx,
        }
    }

    pub fn submitted(&self) -> &DeltaSubmission {
        match self {
            Self::Settled { submitted, .. } | Self::Pending { submitted, .. } => submitted,
        }
    }
}

/// Result of reading the ledger at session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hydration {
    /// The ledger is ahead on at least one counter; these stats (per-counter
    /// maximum of ledger and device, device streaks) replace the local record.
    Adopted(UserStats),
    /// The device is ahead of or equal to the ledger on both counters; local
    /// stats stand.
    KeptLocal,
}

pub struct ReconciliationEngine {
    ledger: Arc<dyn LedgerClient>,
    snapshots: SnapshotRepository,
    events: EventBus,
    config: ReconcileConfig,
}

impl ReconciliationEngine {
    pub fn new(ledger: Arc<dyn LedgerClient>, snapshots: SnapshotRepository, events: EventBus) -> Self {
        Self {
            ledger,
            snapshots,
            events,
            config: ReconcileConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReconcileConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    /// Current baseline for `identity`.
    pub fn snapshot(&self, identity: IdentityId) -> Option<LastSubmitted> {
        self.snapshots.load(identity)
    }

    fn enter(&self, identity: IdentityId, phase: ReconcilePhase) {
        debug!(identity, %phase, "reconcile phase");
        self.events
            .publish(Event::Reconcile(ReconcileEvent::PhaseChanged { identity, phase }));
    }

    fn persist(&self, identity: IdentityId, snapshot: &LastSubmitted) {
        if let Err(e) = self.snapshots.save(identity, snapshot) {
            error!(identity, "Failed to persist ledger snapshot: {}", e);
        }
    }

    /// Pushes the games played since the last snapshot to the ledger.
    ///
    /// Never retries a broadcast submission on its own; a retry is a new call,
    /// which recomputes the delta from the latest snapshot.
    pub async fn submit(&self, local: &UserStats, binding: &WalletBinding) -> Result<ReconcileOutcome> {
        let identity = binding.identity;
        match self.run_submit(local, binding).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.enter(identity, ReconcilePhase::Failed);
                match &e {
                    ReconcileError::RejectedByLedger { .. } => error!(identity, "{}", e),
                    ReconcileError::Validation(_) => debug!(identity, "{}", e),
                    _ => warn!(identity, "{}", e),
                }
                self.events.publish(Event::Reconcile(ReconcileEvent::Failed {
                    identity,
                    error: e.to_string(),
                }));
                Err(e)
            }
        }
    }

    async fn run_submit(&self, local: &UserStats, binding: &WalletBinding) -> Result<ReconcileOutcome> {
        let identity = binding.identity;
        let mut baseline = self.snapshots.load(identity);
        let mut resyncs = 0;

        // The fate of a pending submission is only known to the ledger.
        if baseline.as_ref().is_some_and(LastSubmitted::is_pending) {
            info!(identity, "Previous submission unconfirmed, resyncing from ledger");
            self.enter(identity, ReconcilePhase::Resyncing);
            baseline = Some(self.resync(binding).await?);
            resyncs += 1;
        }

        let submission = loop {
            self.enter(identity, ReconcilePhase::ComputingDelta);
            let delta = Delta::between(local, baseline.as_ref());

            self.enter(identity, ReconcilePhase::Validating);
            let (delta_wins, delta_losses) = delta.validate(self.config.max_batch_games)?;
            let expected_nonce = baseline.as_ref().map(|b| b.nonce).unwrap_or(0);

            self.enter(identity, ReconcilePhase::NonceChecking);
            let ledger_nonce = self
                .ledger
                .read_nonce(&binding.address)
                .await
                .map_err(ReconcileError::LedgerUnavailable)?;

            if ledger_nonce == expected_nonce {
                break DeltaSubmission {
                    delta_wins,
                    delta_losses,
                    expected_nonce,
                };
            }

            if resyncs >= self.config.max_resync_attempts {
                return Err(ReconcileError::Desync {
                    expected: expected_nonce,
                    ledger: ledger_nonce,
                });
            }

            info!(
                identity,
                expected = expected_nonce,
                ledger = ledger_nonce,
                "Snapshot is stale, resyncing from ledger"
            );
            self.enter(identity, ReconcilePhase::Resyncing);
            baseline = Some(self.resync(binding).await?);
            resyncs += 1;
        };

        self.enter(identity, ReconcilePhase::Submitting);
        let receipt = self.ledger.submit_delta(&binding.address, &submission).await?;

        self.enter(identity, ReconcilePhase::Confirming);
        let tx = receipt.transaction_id;
        let next = LastSubmitted {
            games: local.total_games,
            wins: local.wins,
            losses: local.losses,
            nonce: submission.expected_nonce + 1,
            tx_hash: Some(tx.clone()),
            timestamp: Some(Utc::now().timestamp_millis()),
            pending: false,
        };

        match receipt.status {
            TransactionStatus::Confirmed { block_height } => {
                self.persist(identity, &next);
                self.verify_settlement(binding, local, next.nonce).await;

                self.enter(identity, ReconcilePhase::Settled);
                info!(
                    identity,
                    tx = %tx,
                    block_height,
                    wins = submission.delta_wins,
                    losses = submission.delta_losses,
                    "Stats submission confirmed"
                );
                self.events.publish(Event::Reconcile(ReconcileEvent::Settled {
                    identity,
                    tx: tx.clone(),
                    snapshot: next.clone(),
                }));
                Ok(ReconcileOutcome::Settled {
                    tx,
                    submitted: submission,
                    snapshot: next,
                })
            }
            TransactionStatus::Failed { error } => Err(ReconcileError::RejectedByLedger {
                tx: Some(tx),
                reason: error,
            }),
            TransactionStatus::Pending => {
                let next = LastSubmitted {
                    pending: true,
                    ..next
                };
                self.persist(identity, &next);
                warn!(identity, tx = %tx, "Submission not confirmed in time; saved as pending");
                self.events.publish(Event::Reconcile(ReconcileEvent::Pending {
                    identity,
                    tx: tx.clone(),
                }));
                Ok(ReconcileOutcome::Pending {
                    tx,
                    submitted: submission,
                })
            }
        }
    }

    /// Replaces the snapshot with the ledger's own record.
    async fn resync(&self, binding: &WalletBinding) -> Result<LastSubmitted> {
        let stats = self
            .ledger
            .read_stats(&binding.address)
            .await
            .map_err(ReconcileError::LedgerUnavailable)?;
        let snapshot = LastSubmitted::from_ledger(&stats);
        self.persist(binding.identity, &snapshot);
        Ok(snapshot)
    }

    /// Re-reads the ledger after a confirmed submission and logs anything
    /// unexpected. Nothing is overwritten.
    async fn verify_settlement(&self, binding: &WalletBinding, local: &UserStats, expected_nonce: u64) {
        let identity = binding.identity;
        match self.ledger.read_stats(&binding.address).await {
            Ok(stats) => {
                if stats.nonce != expected_nonce {
                    warn!(
                        identity,
                        expected = expected_nonce,
                        ledger = stats.nonce,
                        "Ledger nonce did not advance as expected"
                    );
                }
                if stats.wins != local.wins || stats.losses != local.losses {
                    warn!(
                        identity,
                        ledger_wins = stats.wins,
                        ledger_losses = stats.losses,
                        local_wins = local.wins,
                        local_losses = local.losses,
                        "Ledger totals diverge from local statistics"
                    );
                }
            }
            Err(e) => debug!(identity, "Post-confirmation read failed: {}", e),
        }
    }

    /// Reads the ledger record and makes it the snapshot baseline.
    ///
    /// Local counters are raised to the ledger's wherever the ledger is
    /// ahead, so the baseline never exceeds local stats on either counter.
    /// Returns [`Hydration::KeptLocal`] when nothing had to be raised.
    pub async fn hydrate(&self, binding: &WalletBinding, local: &UserStats) -> Result<Hydration> {
        let identity = binding.identity;
        let ledger = self
            .ledger
            .read_stats(&binding.address)
            .await
            .map_err(ReconcileError::LedgerUnavailable)?;

        self.persist(identity, &LastSubmitted::from_ledger(&ledger));

        let wins = ledger.wins.max(local.wins);
        let losses = ledger.losses.max(local.losses);
        let adopt = wins != local.wins || losses != local.losses;
        self.events.publish(Event::Reconcile(ReconcileEvent::Hydrated {
            identity,
            adopted_ledger_totals: adopt,
        }));

        if adopt {
            let mut stats = *local;
            stats.adopt_totals(wins, losses);
            info!(
                identity,
                ledger_wins = ledger.wins,
                ledger_losses = ledger.losses,
                total = stats.total_games,
                "Adopted ledger totals"
            );
            Ok(Hydration::Adopted(stats))
        } else {
            info!(
                identity,
                ledger_total = ledger.total_games,
                local_total = local.total_games,
                "Device is ahead of ledger; keeping local totals"
            );
            Ok(Hydration::KeptLocal)
        }
    }
}
