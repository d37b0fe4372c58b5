//! Mock ledger for testing.
//!
//! Behaves like the stats contract (nonce check, batch limit, counters) and
//! can be scripted to fail, revert, race with another device, or leave a
//! submission unresolved.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::Notify;

use crate::traits::{LedgerClient, LedgerError, StatsReader, StatsSubmitter};
use crate::types::{
    Address, DeltaSubmission, GasEstimate, LedgerStats, SubmissionReceipt, TransactionId,
    TransactionStatus, MAX_BATCH_GAMES,
};

const MOCK_GAS: u64 = 72_000;

/// One-shot behavior applied to the next submission.
#[derive(Debug, Clone)]
pub enum ScriptedSubmission {
    /// Fail before broadcast.
    Fail(LedgerError),
    /// Included but reverted with the given reason.
    Revert(String),
    /// Broadcast with no observed confirmation. `applied` controls whether
    /// the write actually landed.
    Unconfirmed { applied: bool },
    /// Another device's submission lands just before this one executes.
    Raced { wins: u64, losses: u64 },
}

#[derive(Default)]
struct MockState {
    players: HashMap<Address, LedgerStats>,
    script: VecDeque<ScriptedSubmission>,
    submissions: Vec<(Address, DeltaSubmission)>,
    read_failure: Option<LedgerError>,
    after_next_read: Option<(Address, u64, u64)>,
    block_height: u64,
    tx_counter: u64,
}

impl MockState {
    fn apply(&mut self, player: &Address, wins: u64, losses: u64) {
        self.block_height += 1;
        let timestamp = 1_700_000_000 + self.block_height;
        let stats = self.players.entry(*player).or_default();
        stats.wins += wins;
        stats.losses += losses;
        stats.total_games = stats.wins + stats.losses;
        stats.nonce += 1;
        stats.last_updated = timestamp;
        stats.win_percentage = if stats.total_games == 0 {
            0.0
        } else {
            // Contract reports basis points.
            ((stats.wins * 10_000) / stats.total_games) as f64 / 100.0
        };
    }

    /// Runs the contract's checks and applies the delta.
    fn execute(&mut self, player: &Address, delta: &DeltaSubmission) -> Result<u64, String> {
        let nonce = self.players.get(player).map(|s| s.nonce).unwrap_or_default();
        if delta.expected_nonce != nonce {
            return Err("INVALID_NONCE".to_string());
        }
        if delta.games() == 0 {
            return Err("EMPTY_DELTA".to_string());
        }
        if delta.games() > MAX_BATCH_GAMES {
            return Err("BATCH_TOO_LARGE".to_string());
        }
        self.apply(player, delta.delta_wins, delta.delta_losses);
        Ok(self.block_height)
    }

    fn next_tx_id(&mut self, player: &Address, delta: &DeltaSubmission) -> TransactionId {
        self.tx_counter += 1;
        let mut hasher = Sha256::new();
        hasher.update(player.as_bytes());
        hasher.update(delta.expected_nonce.to_be_bytes());
        hasher.update(delta.delta_wins.to_be_bytes());
        hasher.update(delta.delta_losses.to_be_bytes());
        hasher.update(self.tx_counter.to_be_bytes());
        TransactionId::from_bytes(hasher.finalize().to_vec())
    }
}

/// Mock ledger client for testing without network.
///
/// Cloning shares the underlying state, so a test can keep a handle while the
/// code under test owns another.
#[derive(Clone, Default)]
pub struct MockLedger {
    state: Arc<Mutex<MockState>>,
    held: Arc<AtomicBool>,
    gate: Arc<Notify>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds the record of a player.
    pub fn with_player(self, player: Address, wins: u64, losses: u64, nonce: u64) -> Self {
        {
            let mut state = self.state();
            state.apply(&player, wins, losses);
            if let Some(stats) = state.players.get_mut(&player) {
                stats.nonce = nonce;
            }
        }
        self
    }

    pub fn stats_of(&self, player: &Address) -> LedgerStats {
        self.state().players.get(player).copied().unwrap_or_default()
    }

    /// Every submission that reached the ledger, in order.
    pub fn submissions(&self) -> Vec<(Address, DeltaSubmission)> {
        self.state().submissions.clone()
    }

    pub fn script(&self, behavior: ScriptedSubmission) {
        self.state().script.push_back(behavior);
    }

    /// Makes every read fail with `error` until cleared with `None`.
    pub fn fail_reads(&self, error: Option<LedgerError>) {
        self.state().read_failure = error;
    }

    /// Applies a submission from another device right now.
    pub fn external_write(&self, player: &Address, wins: u64, losses: u64) {
        self.state().apply(player, wins, losses);
    }

    /// Applies a submission from another device right after the next
    /// successful `read_stats`.
    pub fn external_write_after_next_read(&self, player: &Address, wins: u64, losses: u64) {
        self.state().after_next_read = Some((*player, wins, losses));
    }

    /// While held, submissions wait for [`MockLedger::release_one`].
    pub fn hold_submissions(&self, held: bool) {
        self.held.store(held, Ordering::SeqCst);
    }

    pub fn release_one(&self) {
        self.gate.notify_one();
    }

    fn check_reads(&self) -> Result<(), LedgerError> {
        match &self.state().read_failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StatsReader for MockLedger {
    async fn read_stats(&self, player: &Address) -> Result<LedgerStats, LedgerError> {
        self.check_reads()?;
        let mut state = self.state();
        let stats = state.players.get(player).copied().unwrap_or_default();
        if let Some((other, wins, losses)) = state.after_next_read.take() {
            state.apply(&other, wins, losses);
        }
        Ok(stats)
    }

    async fn read_nonce(&self, player: &Address) -> Result<u64, LedgerError> {
        self.check_reads()?;
        Ok(self
            .state()
            .players
            .get(player)
            .map(|s| s.nonce)
            .unwrap_or_default())
    }
}

#[async_trait]
impl StatsSubmitter for MockLedger {
    async fn estimate_submission_gas(
        &self,
        _player: &Address,
        _delta: &DeltaSubmission,
    ) -> Result<GasEstimate, LedgerError> {
        self.check_reads()?;
        Ok(GasEstimate {
            amount: MOCK_GAS,
            unit: "gas".to_string(),
        })
    }

    async fn submit_delta(
        &self,
        player: &Address,
        delta: &DeltaSubmission,
    ) -> Result<SubmissionReceipt, LedgerError> {
        if self.held.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }

        let mut state = self.state();
        state.submissions.push((*player, *delta));

        let status = match state.script.pop_front() {
            Some(ScriptedSubmission::Fail(err)) => return Err(err),
            Some(ScriptedSubmission::Revert(reason)) => TransactionStatus::Failed { error: reason },
            Some(ScriptedSubmission::Unconfirmed { applied }) => {
                if applied {
                    let _ = state.execute(player, delta);
                }
                TransactionStatus::Pending
            }
            Some(ScriptedSubmission::Raced { wins, losses }) => {
                state.apply(player, wins, losses);
                match state.execute(player, delta) {
                    Ok(block_height) => TransactionStatus::Confirmed { block_height },
                    Err(error) => TransactionStatus::Failed { error },
                }
            }
            None => match state.execute(player, delta) {
                Ok(block_height) => TransactionStatus::Confirmed { block_height },
                Err(error) => TransactionStatus::Failed { error },
            },
        };

        Ok(SubmissionReceipt {
            transaction_id: state.next_tx_id(player, delta),
            status,
            gas_used: Some(MOCK_GAS),
        })
    }
}

impl LedgerClient for MockLedger {
    fn name(&self) -> &str {
        "mock"
    }

    fn network(&self) -> &str {
        "local"
    }
}
