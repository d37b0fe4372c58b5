//! Line-oriented driver: reads commands, plays them against a session, and
//! prints the board.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;

use game_core::{GameStatus, GuessOutcome};
use runtime::{Event, GameSession, ReconcileEvent, ReconcileOutcome};

use crate::render;

/// One line of input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Guess(String),
    New,
    Stats,
    Reset,
    Sync,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let input = match line {
            ":new" => Self::New,
            ":stats" => Self::Stats,
            ":reset" => Self::Reset,
            ":sync" => Self::Sync,
            ":help" | ":h" => Self::Help,
            ":quit" | ":q" => Self::Quit,
            other if other.starts_with(':') => Self::Unknown(other.to_string()),
            guess => Self::Guess(guess.to_string()),
        };
        Some(input)
    }
}

const HELP: &str = "Type a 5-letter word and press Enter. Commands: :new :stats :reset :sync :quit";

pub struct Driver<W> {
    session: GameSession,
    reconcile_events: Option<broadcast::Receiver<Event>>,
    out: W,
}

impl<W: Write> Driver<W> {
    pub fn new(session: GameSession, out: W) -> Self {
        Self {
            session,
            reconcile_events: None,
            out,
        }
    }

    /// Reports ledger progress between commands.
    pub fn with_reconcile_events(mut self, rx: broadcast::Receiver<Event>) -> Self {
        self.reconcile_events = Some(rx);
        self
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn into_session(self) -> GameSession {
        self.session
    }

    /// Runs until `:quit` or end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, reader: R) -> Result<()> {
        writeln!(self.out, "{HELP}")?;
        self.print_board()?;

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let Some(input) = Input::parse(&line) else {
                continue;
            };
            if input == Input::Quit {
                break;
            }
            self.handle(input).await?;
            self.drain_reconcile_events()?;
        }
        Ok(())
    }

    async fn handle(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Guess(word) => match self.session.submit_guess(&word) {
                Ok(outcome) => self.on_guess(&outcome)?,
                Err(e) => writeln!(self.out, "! {e}")?,
            },
            Input::New => {
                self.session.new_game();
                self.print_board()?;
            }
            Input::Stats => {
                writeln!(self.out, "{}", render::stats(self.session.stats()))?;
                if self.session.played_today() {
                    writeln!(self.out, "You already finished a game today.")?;
                }
            }
            Input::Reset => {
                if !self.session.reset_stats() {
                    writeln!(self.out, "! Statistics could not be cleared from storage")?;
                }
                writeln!(self.out, "{}", render::stats(self.session.stats()))?;
                self.print_board()?;
            }
            Input::Sync => match self.session.sync_now().await {
                Ok(ReconcileOutcome::Settled { tx, submitted, .. }) => writeln!(
                    self.out,
                    "Synced {} games to the ledger ({})",
                    submitted.games(),
                    tx
                )?,
                Ok(ReconcileOutcome::Pending { tx, .. }) => {
                    writeln!(self.out, "Submitted {tx}; confirmation still pending")?
                }
                Err(e) => writeln!(self.out, "! Sync failed: {e}")?,
            },
            Input::Help => writeln!(self.out, "{HELP}")?,
            Input::Unknown(cmd) => writeln!(self.out, "! Unknown command {cmd}. {HELP}")?,
            Input::Quit => {}
        }
        Ok(())
    }

    fn on_guess(&mut self, outcome: &GuessOutcome) -> Result<()> {
        match outcome.status {
            GameStatus::Playing => self.print_board()?,
            GameStatus::Won => {
                write!(self.out, "{}", render::board(&self.session.board()))?;
                writeln!(self.out, "Solved in {} of 6!", outcome.row + 1)?;
                writeln!(self.out, "{}", render::stats(self.session.stats()))?;
            }
            GameStatus::Lost => {
                write!(self.out, "{}", render::board(&self.session.board()))?;
                writeln!(self.out, "Out of guesses.")?;
                writeln!(self.out, "{}", render::stats(self.session.stats()))?;
            }
        }
        if outcome.status.is_terminal() && self.session.status().is_terminal() {
            writeln!(self.out, "Type :new to play again.")?;
        }
        Ok(())
    }

    fn print_board(&mut self) -> Result<()> {
        write!(self.out, "{}", render::board(&self.session.board()))?;
        write!(self.out, "{}", render::keyboard(&self.session.keyboard_hints()))?;
        Ok(())
    }

    fn drain_reconcile_events(&mut self) -> Result<()> {
        let Some(rx) = self.reconcile_events.as_mut() else {
            return Ok(());
        };
        while let Ok(event) = rx.try_recv() {
            match event {
                Event::Reconcile(ReconcileEvent::Settled { tx, snapshot, .. }) => writeln!(
                    self.out,
                    "Ledger updated: {} games recorded ({})",
                    snapshot.games, tx
                )?,
                Event::Reconcile(ReconcileEvent::Pending { tx, .. }) => {
                    writeln!(self.out, "Ledger submission {tx} is still pending")?
                }
                Event::Reconcile(ReconcileEvent::Failed { error, .. }) => {
                    writeln!(self.out, "Ledger sync failed: {error}")?
                }
                _ => {}
            }
        }
        Ok(())
    }
}
