//! Shared bootstrap utilities for client front-ends.
//!
//! Provides configuration loading and runtime setup (storage, dictionary,
//! ledger client) that can be reused by any front-end crate.
pub mod builder;
pub mod config;

pub use builder::{RuntimeBuilder, RuntimeSetup};
pub use config::AppConfig;
