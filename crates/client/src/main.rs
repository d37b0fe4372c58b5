//! Word game client binary.
//!
//! Main entry point: loads configuration, sets up logging, assembles the
//! runtime, and hands stdin to the line driver.
//!
//! # Examples
//!
//! ```bash
//! # Offline, anonymous
//! cargo run -p wordle-client
//!
//! # Identified player with ledger sync
//! WORDLE_IDENTITY=42 WORDLE_WALLET_ADDRESS=0x... LEDGER_WALLET_RPC_URL=http://localhost:8545 \
//!     cargo run -p wordle-client
//! ```

use anyhow::Result;
use tokio::io::BufReader;

use client_bootstrap::{AppConfig, RuntimeBuilder};
use runtime::{Hydration, ReconcileError, Topic};
use wordle_client::{Driver, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!("Starting wordle client");
    let setup = RuntimeBuilder::new(config).build()?;
    let identity = setup.config.session_identity();
    tracing::info!("Session: {}", identity);

    let mut session = setup.runtime.session(identity);
    if setup.config.reconciliation_enabled() {
        match session.hydrate().await {
            Ok(Hydration::Adopted(stats)) => {
                tracing::info!("Loaded {} games from the ledger", stats.total_games)
            }
            Ok(Hydration::KeptLocal) => {}
            Err(ReconcileError::WorkerUnavailable) => {}
            Err(e) => tracing::warn!("Ledger hydration skipped: {}", e),
        }
    }

    let events = setup.runtime.event_bus().subscribe(Topic::Reconcile);
    let mut driver = Driver::new(session, std::io::stdout()).with_reconcile_events(events);
    driver.run(BufReader::new(tokio::io::stdin())).await?;

    drop(driver);
    setup.runtime.shutdown().await?;
    tracing::info!("Client shutdown complete");
    Ok(())
}
