//! Finished games reaching the ledger through the reconcile worker.

use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{Address, DeltaSubmission, LedgerError, MockLedger, ScriptedSubmission};
use game_content::StaticWordList;
use game_core::{UserStats, Word};
use runtime::{
    DeltaError, Event, Hydration, InMemoryKvStore, ReconcileError, ReconcileEvent,
    ReconcileOutcome, ReconcilePhase, Runtime, SessionIdentity, SnapshotRepository, Topic,
    WalletBinding,
};
use tokio::sync::broadcast;
use tokio::time::timeout;

const ID: u64 = 21;

fn address() -> Address {
    Address([0xab; 20])
}

fn binding() -> WalletBinding {
    WalletBinding {
        identity: ID,
        address: address(),
    }
}

fn word(s: &str) -> Word {
    Word::parse(s).unwrap()
}

fn runtime(kv: Arc<InMemoryKvStore>, ledger: &MockLedger) -> Runtime {
    Runtime::builder()
        .store(kv)
        .words(Arc::new(StaticWordList::new(
            [word("CRANE")],
            [word("TRACE"), word("SLATE")],
        )))
        .ledger(Arc::new(ledger.clone()))
        .build()
        .unwrap()
}

fn stats(wins: u64, losses: u64) -> UserStats {
    UserStats {
        total_games: wins + losses,
        wins,
        losses,
        ..Default::default()
    }
}

/// Waits for the first reconcile event matching `pred`.
async fn wait_for(
    rx: &mut broadcast::Receiver<Event>,
    pred: impl Fn(&ReconcileEvent) -> bool,
) -> ReconcileEvent {
    timeout(Duration::from_secs(5), async {
        loop {
            if let Ok(Event::Reconcile(event)) = rx.recv().await {
                if pred(&event) {
                    return event;
                }
            }
        }
    })
    .await
    .expect("reconcile event not published in time")
}

#[tokio::test]
async fn finished_game_is_submitted_in_the_background() {
    let kv = Arc::new(InMemoryKvStore::new());
    let ledger = MockLedger::new();
    let runtime = runtime(kv.clone(), &ledger);
    let mut rx = runtime.event_bus().subscribe(Topic::Reconcile);
    let mut session = runtime.session(SessionIdentity::WithWallet(binding()));

    session.submit_guess("CRANE").unwrap();

    let settled = wait_for(&mut rx, |e| matches!(e, ReconcileEvent::Settled { .. })).await;
    let ReconcileEvent::Settled { identity, snapshot, .. } = settled else {
        unreachable!();
    };
    assert_eq!(identity, ID);
    assert_eq!((snapshot.wins, snapshot.losses, snapshot.nonce), (1, 0, 1));
    assert_eq!(ledger.stats_of(&address()).wins, 1);

    let stored = SnapshotRepository::new(kv).load(ID).unwrap();
    assert_eq!(stored, snapshot);
}

#[tokio::test]
async fn sessions_without_wallet_never_touch_the_ledger() {
    let kv = Arc::new(InMemoryKvStore::new());
    let ledger = MockLedger::new();
    let runtime = runtime(kv, &ledger);
    let mut session = runtime.session(SessionIdentity::Identified { id: ID });

    session.submit_guess("CRANE").unwrap();
    assert!(matches!(session.sync_now().await, Err(ReconcileError::NoWallet)));

    drop(session);
    runtime.shutdown().await.unwrap();
    assert!(ledger.submissions().is_empty());
}

#[tokio::test]
async fn second_submission_while_in_flight_is_refused() {
    let kv = Arc::new(InMemoryKvStore::new());
    let ledger = MockLedger::new();
    ledger.hold_submissions(true);
    let runtime = runtime(kv, &ledger);
    let handle = runtime.reconciler().unwrap();
    let mut rx = runtime.event_bus().subscribe(Topic::Reconcile);

    let first = tokio::spawn({
        let handle = handle.clone();
        async move { handle.submit(binding(), stats(1, 0)).await }
    });
    wait_for(&mut rx, |e| {
        matches!(e, ReconcileEvent::PhaseChanged { phase: ReconcilePhase::Submitting, .. })
    })
    .await;

    let second = handle.submit(binding(), stats(2, 0)).await;
    assert!(matches!(second, Err(ReconcileError::InFlight(ID))));

    // Another identity is not blocked.
    let other = WalletBinding {
        identity: ID + 1,
        address: Address([0xcd; 20]),
    };
    let other_task = tokio::spawn({
        let handle = handle.clone();
        async move { handle.submit(other, stats(1, 1)).await }
    });

    ledger.release_one();
    ledger.release_one();
    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, ReconcileOutcome::Settled { .. }));
    assert!(other_task.await.unwrap().is_ok());

    // The skipped game goes out with the next attempt.
    ledger.hold_submissions(false);
    let next = handle.submit(binding(), stats(2, 0)).await.unwrap();
    assert_eq!(
        *next.submitted(),
        DeltaSubmission {
            delta_wins: 1,
            delta_losses: 0,
            expected_nonce: 1
        }
    );
    assert_eq!(ledger.stats_of(&address()).wins, 2);
}

#[tokio::test]
async fn concurrent_writer_forces_a_single_resync() {
    let kv = Arc::new(InMemoryKvStore::new());
    let ledger = MockLedger::new();
    let runtime = runtime(kv, &ledger);
    let handle = runtime.reconciler().unwrap();

    handle.submit(binding(), stats(3, 2)).await.unwrap();
    // Another device pushes two more games.
    ledger.external_write(&address(), 1, 1);

    let outcome = handle.submit(binding(), stats(5, 3)).await.unwrap();
    assert_eq!(
        *outcome.submitted(),
        DeltaSubmission {
            delta_wins: 1,
            delta_losses: 0,
            expected_nonce: 2
        }
    );
    assert_eq!(ledger.submissions().len(), 2);
}

#[tokio::test]
async fn rejection_and_outage_leave_local_stats_alone() {
    let kv = Arc::new(InMemoryKvStore::new());
    let ledger = MockLedger::new();
    let runtime = runtime(kv, &ledger);
    let mut session = runtime.session(SessionIdentity::WithWallet(binding()));
    let mut rx = runtime.event_bus().subscribe(Topic::Reconcile);

    ledger.script(ScriptedSubmission::Revert("paused".into()));
    session.submit_guess("CRANE").unwrap();
    wait_for(&mut rx, |e| matches!(e, ReconcileEvent::Failed { .. })).await;
    assert_eq!(session.stats().wins, 1);

    ledger.fail_reads(Some(LedgerError::Network("offline".into())));
    let err = session.sync_now().await.unwrap_err();
    assert!(matches!(err, ReconcileError::LedgerUnavailable(_)));
    assert!(err.severity().is_recoverable());

    // Manual retry once the ledger is back.
    ledger.fail_reads(None);
    let outcome = session.sync_now().await.unwrap();
    assert!(matches!(outcome, ReconcileOutcome::Settled { .. }));
    assert_eq!(ledger.stats_of(&address()).wins, 1);
    assert_eq!(session.stats().wins, 1);
}

#[tokio::test]
async fn nothing_new_is_a_validation_error() {
    let kv = Arc::new(InMemoryKvStore::new());
    let ledger = MockLedger::new();
    let runtime = runtime(kv, &ledger);
    let session = runtime.session(SessionIdentity::WithWallet(binding()));

    let err = session.sync_now().await.unwrap_err();
    assert!(matches!(err, ReconcileError::Validation(DeltaError::NothingToSubmit)));
}

#[tokio::test]
async fn hydration_adopts_a_dominating_ledger() {
    let kv = Arc::new(InMemoryKvStore::new());
    let ledger = MockLedger::new().with_player(address(), 10, 4, 3);
    let runtime = runtime(kv, &ledger);
    let mut session = runtime.session(SessionIdentity::WithWallet(binding()));

    let hydration = session.hydrate().await.unwrap();
    assert!(matches!(hydration, Hydration::Adopted(_)));
    assert_eq!(session.stats().total_games, 14);

    // A game played after hydration is the whole delta.
    session.submit_guess("CRANE").unwrap();
    drop(session);
    let session = runtime.session(SessionIdentity::WithWallet(binding()));
    assert_eq!(session.stats().wins, 11);

    let submitted = timeout(Duration::from_secs(5), async {
        loop {
            if let Some((_, submission)) = ledger.submissions().last().copied() {
                return submission;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    assert_eq!(
        submitted,
        DeltaSubmission {
            delta_wins: 1,
            delta_losses: 0,
            expected_nonce: 3
        }
    );
}

#[tokio::test]
async fn hydration_keeps_a_device_that_is_ahead() {
    let kv = Arc::new(InMemoryKvStore::with_entries([(
        "wordle-stats-21",
        r#"{"totalGames":3,"wins":3,"losses":0,"currentStreak":3,"maxStreak":3}"#,
    )]));
    let ledger = MockLedger::new().with_player(address(), 1, 0, 1);
    let runtime = runtime(kv, &ledger);
    let mut session = runtime.session(SessionIdentity::WithWallet(binding()));

    let hydration = session.hydrate().await.unwrap();
    assert_eq!(hydration, Hydration::KeptLocal);
    assert_eq!(session.stats().wins, 3);

    // The ledger's record became the baseline, so only the difference goes out.
    let outcome = session.sync_now().await.unwrap();
    assert_eq!(
        *outcome.submitted(),
        DeltaSubmission {
            delta_wins: 2,
            delta_losses: 0,
            expected_nonce: 1
        }
    );
}

#[tokio::test]
async fn hydration_merges_counters_when_each_side_leads_one() {
    let kv = Arc::new(InMemoryKvStore::with_entries([(
        "wordle-stats-21",
        r#"{"totalGames":6,"wins":5,"losses":1,"currentStreak":2,"maxStreak":4}"#,
    )]));
    let ledger = MockLedger::new().with_player(address(), 3, 2, 4);
    let runtime = runtime(kv, &ledger);
    let mut rx = runtime.event_bus().subscribe(Topic::Reconcile);
    let mut session = runtime.session(SessionIdentity::WithWallet(binding()));

    let hydration = session.hydrate().await.unwrap();
    assert!(matches!(hydration, Hydration::Adopted(_)));
    let merged = session.stats();
    assert_eq!((merged.wins, merged.losses, merged.total_games), (5, 2, 7));
    assert_eq!(merged.current_streak, 2);

    session.submit_guess("CRANE").unwrap();

    let settled = wait_for(&mut rx, |e| matches!(e, ReconcileEvent::Settled { .. })).await;
    let ReconcileEvent::Settled { snapshot, .. } = settled else {
        unreachable!();
    };
    assert_eq!((snapshot.wins, snapshot.losses, snapshot.nonce), (6, 2, 5));
    assert_eq!(
        ledger.submissions().last().map(|(_, s)| *s),
        Some(DeltaSubmission {
            delta_wins: 3,
            delta_losses: 0,
            expected_nonce: 4
        })
    );
}

#[tokio::test]
async fn hydration_outage_changes_nothing() {
    let kv = Arc::new(InMemoryKvStore::new());
    let ledger = MockLedger::new().with_player(address(), 10, 4, 3);
    ledger.fail_reads(Some(LedgerError::Network("offline".into())));
    let runtime = runtime(kv.clone(), &ledger);
    let mut session = runtime.session(SessionIdentity::WithWallet(binding()));

    assert!(matches!(
        session.hydrate().await,
        Err(ReconcileError::LedgerUnavailable(_))
    ));
    assert_eq!(session.stats().total_games, 0);
    assert_eq!(SnapshotRepository::new(kv).load(ID), None);
}
