//! Terminal client for the word game.
//!
//! # Architecture
//!
//! ```text
//! main (composition root)
//!   ├─→ client-bootstrap (config, storage, dictionary, ledger client)
//!   ├─→ runtime::GameSession (board, statistics, reconciliation hook)
//!   └─→ Driver (stdin lines in, plain-text board out)
//! ```

pub mod driver;
pub mod logging;
pub mod render;

pub use driver::{Driver, Input};
