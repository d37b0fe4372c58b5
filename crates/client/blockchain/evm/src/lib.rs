//! EVM backend for the stats ledger.
//!
//! Talks plain JSON-RPC to a node for reads and to a signing endpoint for
//! submissions, and encodes calls to the stats contract by hand.

pub mod client;
pub mod config;
pub mod contracts;
pub mod rpc;

pub use client::EvmLedgerClient;
pub use config::{EvmConfig, EvmNetwork};
