//! EVM ledger configuration.

use std::env;
use std::time::Duration;

use client_blockchain_core::{Address, BlockchainConfig};

/// Deployed stats contract on Base mainnet.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xBF0a43607795260B609e6E36d0fD526b3f112628";

/// Known EVM networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvmNetwork {
    /// Base mainnet (chain 8453)
    BaseMainnet,
    /// Base Sepolia testnet (chain 84532)
    BaseSepolia,
    /// Local development node (chain 31337)
    Local,
    /// Any other chain id
    Other(u64),
}

impl EvmNetwork {
    pub fn from_chain_id(chain_id: u64) -> Self {
        match chain_id {
            8453 => EvmNetwork::BaseMainnet,
            84532 => EvmNetwork::BaseSepolia,
            31337 => EvmNetwork::Local,
            other => EvmNetwork::Other(other),
        }
    }

    pub fn chain_id(&self) -> u64 {
        match self {
            EvmNetwork::BaseMainnet => 8453,
            EvmNetwork::BaseSepolia => 84532,
            EvmNetwork::Local => 31337,
            EvmNetwork::Other(id) => *id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EvmNetwork::BaseMainnet => "base-mainnet",
            EvmNetwork::BaseSepolia => "base-sepolia",
            EvmNetwork::Local => "evm-local",
            EvmNetwork::Other(_) => "evm-custom",
        }
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            EvmNetwork::BaseMainnet => "https://mainnet.base.org",
            EvmNetwork::BaseSepolia => "https://sepolia.base.org",
            EvmNetwork::Local | EvmNetwork::Other(_) => "http://127.0.0.1:8545",
        }
    }
}

/// EVM-specific configuration.
#[derive(Debug, Clone)]
pub struct EvmConfig {
    /// Chain the contract lives on
    pub network: EvmNetwork,

    /// Custom read RPC endpoint (overrides network default)
    pub rpc_url: Option<String>,

    /// Endpoint that signs `eth_sendTransaction` for the player's account.
    /// Without it the client is read-only.
    pub wallet_rpc_url: Option<String>,

    /// Stats contract address
    pub contract_address: String,

    /// Blocks required on top of the inclusion block
    pub confirmations: u64,

    /// How long to wait for confirmations before reporting the outcome as pending
    pub confirm_timeout: Duration,

    /// Receipt polling interval
    pub poll_interval: Duration,
}

impl EvmConfig {
    pub fn new(network: EvmNetwork) -> Self {
        Self {
            network,
            rpc_url: None,
            wallet_rpc_url: None,
            contract_address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            confirmations: 3,
            confirm_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(2000),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LEDGER_CHAIN_ID` - Chain id (default: 8453)
    /// - `LEDGER_RPC_URL` - Custom read endpoint
    /// - `LEDGER_WALLET_RPC_URL` - Signing endpoint for submissions
    /// - `LEDGER_CONTRACT_ADDRESS` - Stats contract address
    /// - `LEDGER_CONFIRMATIONS` - Required confirmations (default: 3)
    /// - `LEDGER_CONFIRM_TIMEOUT_SECS` - Confirmation deadline (default: 120)
    /// - `LEDGER_POLL_INTERVAL_MS` - Receipt polling interval (default: 2000)
    pub fn from_env() -> Result<Self, String> {
        let chain_id = match env::var("LEDGER_CHAIN_ID") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("Invalid LEDGER_CHAIN_ID {raw}: {e}"))?,
            Err(_) => 8453,
        };

        let mut config = Self::new(EvmNetwork::from_chain_id(chain_id));
        config.rpc_url = env::var("LEDGER_RPC_URL").ok();
        config.wallet_rpc_url = env::var("LEDGER_WALLET_RPC_URL").ok();
        if let Ok(address) = env::var("LEDGER_CONTRACT_ADDRESS") {
            config.contract_address = address;
        }
        if let Some(confirmations) = read_u64("LEDGER_CONFIRMATIONS") {
            config.confirmations = confirmations;
        }
        if let Some(secs) = read_u64("LEDGER_CONFIRM_TIMEOUT_SECS") {
            config.confirm_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = read_u64("LEDGER_POLL_INTERVAL_MS") {
            config.poll_interval = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn with_rpc_url(mut self, url: String) -> Self {
        self.rpc_url = Some(url);
        self
    }

    pub fn with_wallet_rpc_url(mut self, url: String) -> Self {
        self.wallet_rpc_url = Some(url);
        self
    }

    pub fn with_contract_address(mut self, address: String) -> Self {
        self.contract_address = address;
        self
    }

    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Get the read RPC URL (custom or default for network).
    pub fn get_rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_rpc_url())
    }

    pub fn contract(&self) -> Result<Address, String> {
        self.contract_address
            .parse()
            .map_err(|e| format!("Invalid contract address: {e}"))
    }
}

fn read_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|s| s.trim().parse::<u64>().ok())
}

fn check_url(url: &str) -> Result<(), String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!("Invalid RPC URL format: {}", url));
    }
    Ok(())
}

impl BlockchainConfig for EvmConfig {
    fn network_name(&self) -> &str {
        self.network.name()
    }

    fn rpc_url(&self) -> &str {
        self.get_rpc_url()
    }

    fn validate(&self) -> Result<(), String> {
        check_url(self.get_rpc_url())?;
        if let Some(ref wallet) = self.wallet_rpc_url {
            check_url(wallet)?;
        }

        if self.network.chain_id() == 0 {
            return Err("Chain id must be greater than 0".to_string());
        }

        self.contract()?;

        if self.confirmations == 0 {
            return Err("Confirmations must be at least 1".to_string());
        }
        if self.poll_interval.is_zero() {
            return Err("Poll interval must be greater than 0".to_string());
        }

        Ok(())
    }
}
