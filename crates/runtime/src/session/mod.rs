//! Player-facing session: board, statistics and the hook into reconciliation.

mod controller;

pub use controller::GameSession;
