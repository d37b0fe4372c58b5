//! Game session controller.
//!
//! Owns the board and the local statistics for one identity. Gameplay is
//! synchronous; finishing a game hands the new totals to the reconcile worker
//! without waiting for it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use game_core::{
    GameConfig, GameOutcome, GameState, GameStatus, GuessError, GuessOutcome, KeyboardHints, Tile,
    UserStats, WORD_LENGTH, WordList,
};

use crate::api::{ReconcileError, ReconcileHandle};
use crate::events::{Event, EventBus, GameEvent};
use crate::identity::{SessionIdentity, WalletBinding};
use crate::reconcile::{Hydration, ReconcileOutcome};
use crate::repository::{Partition, StatsStore};

pub struct GameSession {
    identity: SessionIdentity,
    partition: Partition,
    state: GameState,
    stats: UserStats,
    words: Arc<dyn WordList>,
    store: StatsStore,
    reconciler: Option<ReconcileHandle>,
    events: EventBus,
    config: GameConfig,
}

impl GameSession {
    /// Opens a session for `identity`, resuming an unfinished game if one was
    /// saved.
    ///
    /// Legacy records are migrated into an identified partition first. A saved
    /// game that is finished or fails its consistency check is discarded.
    pub fn start(
        identity: SessionIdentity,
        words: Arc<dyn WordList>,
        store: StatsStore,
        events: EventBus,
        config: GameConfig,
    ) -> Self {
        if let Some(id) = identity.id() {
            store.migrate_legacy(id);
        }

        let partition = identity.partition();
        let stats = store.load(partition);
        let resumed = store
            .load_game_state(partition)
            .filter(|state| state.status == GameStatus::Playing && state.is_consistent());

        let (state, fresh) = match resumed {
            Some(state) => {
                info!(%identity, row = state.current_row, "Resumed game in progress");
                (state, false)
            }
            None => (GameState::new(words.random_word()), true),
        };

        let session = Self {
            identity,
            partition,
            state,
            stats,
            words,
            store,
            reconciler: None,
            events,
            config,
        };
        if fresh {
            session.announce_new_game();
        }
        session
    }

    /// Enables reconciliation for sessions with a wallet.
    pub fn with_reconciler(mut self, reconciler: ReconcileHandle) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    /// Starts a fresh game with a random target.
    pub fn new_game(&mut self) {
        self.state = GameState::new(self.words.random_word());
        self.announce_new_game();
    }

    fn announce_new_game(&self) {
        self.persist_state();
        debug!(identity = %self.identity, "New game started");
        self.events.publish(Event::Game(GameEvent::NewGame));
    }

    /// Appends a letter to the row being typed. Returns whether it was taken.
    pub fn type_letter(&mut self, letter: char) -> bool {
        let changed = self.state.push_letter(letter);
        if changed {
            self.persist_state();
        }
        changed
    }

    pub fn delete_letter(&mut self) -> bool {
        let changed = self.state.pop_letter();
        if changed {
            self.persist_state();
        }
        changed
    }

    /// Submits the typed row.
    pub fn submit_current(&mut self) -> Result<GuessOutcome, GuessError> {
        let outcome = self.state.submit_current(self.words.as_ref())?;
        self.after_guess(&outcome);
        Ok(outcome)
    }

    /// Submits `raw` as a full guess, ignoring the typed row.
    ///
    /// On error nothing changes.
    pub fn submit_guess(&mut self, raw: &str) -> Result<GuessOutcome, GuessError> {
        let outcome = self.state.submit_guess(raw, self.words.as_ref())?;
        self.after_guess(&outcome);
        Ok(outcome)
    }

    fn after_guess(&mut self, outcome: &GuessOutcome) {
        self.events.publish(Event::Game(GameEvent::GuessAccepted {
            guess: outcome.guess,
            evaluation: outcome.evaluation,
            row: outcome.row,
            status: outcome.status,
        }));

        match outcome.status.outcome() {
            Some(result) => self.finish(result),
            None => self.persist_state(),
        }
    }

    /// Runs once per game, on the transition into a terminal status.
    fn finish(&mut self, result: GameOutcome) {
        self.stats.record(result);
        self.store.save(self.partition, &self.stats);
        self.store.mark_played(self.partition);
        self.store.clear_game_state(self.partition);

        info!(
            identity = %self.identity,
            ?result,
            attempts = self.state.attempts(),
            total = self.stats.total_games,
            "Game finished"
        );
        self.events.publish(Event::Game(GameEvent::GameFinished {
            outcome: result,
            attempts: self.state.attempts(),
            target: self.state.target_word,
        }));
        self.events.publish(Event::Game(GameEvent::StatsUpdated { stats: self.stats }));

        self.request_sync();

        if self.config.auto_new_game {
            self.new_game();
        }
    }

    fn request_sync(&self) {
        let (Some(reconciler), Some(binding)) = (&self.reconciler, self.identity.wallet()) else {
            return;
        };
        match reconciler.submit_detached(*binding, self.stats) {
            Ok(()) => debug!(identity = binding.identity, "Queued ledger submission"),
            Err(e) => warn!(identity = binding.identity, "Could not queue ledger submission: {}", e),
        }
    }

    fn persist_state(&self) {
        if self.state.status == GameStatus::Playing {
            self.store.save_game_state(self.partition, &self.state);
        }
    }

    pub fn board(&self) -> Vec<[Tile; WORD_LENGTH]> {
        self.state.board()
    }

    pub fn keyboard_hints(&self) -> KeyboardHints {
        self.state.keyboard_hints()
    }

    pub fn attempts(&self) -> usize {
        self.state.attempts()
    }

    pub fn played_today(&self) -> bool {
        self.store.played_today(self.partition)
    }

    /// Clears statistics, the saved game and the ledger snapshot, then starts
    /// over. The in-memory stats are zeroed even if storage fails.
    pub fn reset_stats(&mut self) -> bool {
        let stored = self.store.reset(self.partition);
        self.stats = UserStats::default();
        self.events.publish(Event::Game(GameEvent::StatsUpdated { stats: self.stats }));
        self.new_game();
        stored
    }

    /// Reads the ledger record and raises local counters to the ledger's
    /// wherever the ledger is ahead.
    ///
    /// Ledger failures leave local statistics untouched.
    pub async fn hydrate(&mut self) -> Result<Hydration, ReconcileError> {
        let (reconciler, binding) = self.reconcile_target()?;
        let hydration = reconciler.hydrate(binding, self.stats).await?;

        if let Hydration::Adopted(stats) = hydration {
            self.stats = stats;
            self.store.save(self.partition, &self.stats);
            self.events.publish(Event::Game(GameEvent::StatsUpdated { stats: self.stats }));
        }
        Ok(hydration)
    }

    /// Manually submits everything not yet on the ledger and waits for the
    /// result.
    pub async fn sync_now(&self) -> Result<ReconcileOutcome, ReconcileError> {
        let (reconciler, binding) = self.reconcile_target()?;
        reconciler.submit(binding, self.stats).await
    }

    fn reconcile_target(&self) -> Result<(ReconcileHandle, WalletBinding), ReconcileError> {
        let binding = self.identity.wallet().copied().ok_or(ReconcileError::NoWallet)?;
        let reconciler = self.reconciler.clone().ok_or(ReconcileError::WorkerUnavailable)?;
        Ok((reconciler, binding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::Word;

    use crate::repository::{InMemoryKvStore, KeyValueStore};

    struct FixedWords(Word);

    impl WordList for FixedWords {
        fn random_word(&self) -> Word {
            self.0
        }

        fn contains(&self, word: &Word) -> bool {
            matches!(word.to_string().as_str(), "CRANE" | "TRACE" | "SLATE" | "PLUMB" | "GHOST" | "WINDY" | "FJORD")
        }

        fn len(&self) -> usize {
            7
        }
    }

    fn session(kv: Arc<InMemoryKvStore>, identity: SessionIdentity) -> GameSession {
        GameSession::start(
            identity,
            Arc::new(FixedWords(Word::parse("CRANE").unwrap())),
            StatsStore::new(kv),
            EventBus::new(),
            GameConfig::default(),
        )
    }

    #[test]
    fn typing_is_persisted_and_resumed() {
        let kv = Arc::new(InMemoryKvStore::new());
        let id = SessionIdentity::Identified { id: 3 };

        let mut first = session(kv.clone(), id);
        first.submit_guess("SLATE").unwrap();
        for c in "tra".chars() {
            assert!(first.type_letter(c));
        }
        assert!(!first.type_letter('1'));

        let resumed = session(kv, id);
        assert_eq!(resumed.attempts(), 1);
        assert_eq!(resumed.state().current_guess.as_str(), "TRA");
    }

    #[test]
    fn invalid_guess_changes_nothing() {
        let kv = Arc::new(InMemoryKvStore::new());
        let mut game = session(kv, SessionIdentity::Anonymous);

        assert!(matches!(game.submit_guess("CRAN"), Err(GuessError::InvalidLength { len: 4 })));
        assert!(matches!(game.submit_guess("ZZZZZ"), Err(GuessError::UnknownWord(_))));
        assert_eq!(game.attempts(), 0);
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn win_records_stats_once_and_clears_saved_game() {
        let kv = Arc::new(InMemoryKvStore::new());
        let id = SessionIdentity::Identified { id: 8 };
        let mut game = session(kv.clone(), id);

        game.submit_guess("TRACE").unwrap();
        let outcome = game.submit_guess("crane").unwrap();
        assert_eq!(outcome.status, GameStatus::Won);
        assert!(matches!(game.submit_guess("CRANE"), Err(GuessError::GameOver)));

        assert_eq!(game.stats().wins, 1);
        assert_eq!(game.stats().current_streak, 1);
        assert!(game.played_today());
        assert_eq!(kv.get("wordle-game-state-8").unwrap(), None);
        assert_eq!(StatsStore::new(kv).load(Partition::Identity(8)).wins, 1);
    }

    #[test]
    fn auto_new_game_rolls_over() {
        let kv = Arc::new(InMemoryKvStore::new());
        let mut game = GameSession::start(
            SessionIdentity::Anonymous,
            Arc::new(FixedWords(Word::parse("CRANE").unwrap())),
            StatsStore::new(kv),
            EventBus::new(),
            GameConfig::with_auto_new_game(true),
        );
        game.submit_guess("CRANE").unwrap();
        assert_eq!(game.status(), GameStatus::Playing);
        assert_eq!(game.attempts(), 0);
        assert_eq!(game.stats().wins, 1);
    }

    #[tokio::test]
    async fn sync_without_wallet_is_refused() {
        let kv = Arc::new(InMemoryKvStore::new());
        let mut game = session(kv, SessionIdentity::Identified { id: 1 });
        assert!(matches!(game.sync_now().await, Err(ReconcileError::NoWallet)));
        assert!(matches!(game.hydrate().await, Err(ReconcileError::NoWallet)));
    }
}
