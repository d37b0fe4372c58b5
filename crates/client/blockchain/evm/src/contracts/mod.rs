//! Contract bindings.

pub mod stats_ledger;
