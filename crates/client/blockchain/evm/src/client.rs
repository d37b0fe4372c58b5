//! EVM ledger client implementation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::{Instant, sleep};

use client_blockchain_core::{
    Address, BlockchainConfig, DeltaSubmission, GasEstimate, LedgerClient, LedgerError,
    LedgerStats, StatsReader, StatsSubmitter, SubmissionReceipt, TransactionId,
    TransactionStatus,
};

use crate::config::EvmConfig;
use crate::contracts::stats_ledger;
use crate::rpc::{JsonRpcClient, parse_quantity, to_quantity};

/// Gas limit used when estimation fails for reasons other than a revert.
pub const FALLBACK_GAS_LIMIT: u64 = 100_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionReceipt {
    status: Option<String>,
    block_number: Option<String>,
    gas_used: Option<String>,
}

/// Adds the 20% safety buffer to a raw estimate.
pub fn buffered_gas(raw: u64) -> u64 {
    raw.saturating_mul(12) / 10
}

/// Stats ledger client for EVM chains.
///
/// Reads go through the configured node; submissions go through the wallet
/// endpoint, which signs `eth_sendTransaction` for the player's account.
pub struct EvmLedgerClient {
    config: EvmConfig,
    contract: Address,
    node: JsonRpcClient,
    wallet: Option<JsonRpcClient>,
}

impl EvmLedgerClient {
    /// Create a new EVM ledger client.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid.
    pub fn new(config: EvmConfig) -> Result<Self, LedgerError> {
        config.validate().map_err(LedgerError::Config)?;
        let contract = config.contract().map_err(LedgerError::Config)?;

        let node = JsonRpcClient::new(config.get_rpc_url());
        let wallet = config.wallet_rpc_url.as_deref().map(JsonRpcClient::new);

        Ok(Self {
            config,
            contract,
            node,
            wallet,
        })
    }

    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    pub fn can_submit(&self) -> bool {
        self.wallet.is_some()
    }

    async fn ensure_network(&self, rpc: &JsonRpcClient) -> Result<(), LedgerError> {
        let raw: String = rpc.call("eth_chainId", json!([])).await?;
        let actual = parse_quantity(&raw)?;
        let expected = self.config.network.chain_id();
        if actual != expected {
            tracing::warn!(expected, actual, endpoint = rpc.url(), "Connected to wrong network");
            return Err(LedgerError::WrongNetwork { expected, actual });
        }
        Ok(())
    }

    async fn ensure_contract(&self) -> Result<(), LedgerError> {
        let code: String = self
            .node
            .call("eth_getCode", json!([self.contract.to_string(), "latest"]))
            .await?;
        if code.trim_start_matches("0x").is_empty() {
            return Err(LedgerError::ContractMissing(self.contract));
        }
        Ok(())
    }

    async fn eth_call(&self, data: String) -> Result<String, LedgerError> {
        self.node
            .call(
                "eth_call",
                json!([{ "to": self.contract.to_string(), "data": data }, "latest"]),
            )
            .await
    }

    fn transaction_request(&self, player: &Address, delta: &DeltaSubmission) -> Value {
        json!({
            "from": player.to_string(),
            "to": self.contract.to_string(),
            "data": stats_ledger::submit_stats_snapshot(delta),
        })
    }

    /// Polls for the receipt until it has enough confirmations or the
    /// deadline passes.
    async fn wait_for_confirmations(&self, tx: &TransactionId) -> (TransactionStatus, Option<u64>) {
        let deadline = Instant::now() + self.config.confirm_timeout;
        let required = self.config.confirmations;

        loop {
            match self.poll_receipt(tx, required).await {
                Ok(Some(outcome)) => return outcome,
                Ok(None) => {}
                Err(e) => tracing::debug!(tx = %tx, error = %e, "Receipt poll failed"),
            }

            if Instant::now() + self.config.poll_interval > deadline {
                tracing::warn!(tx = %tx, "Confirmation not observed before deadline");
                return (TransactionStatus::Pending, None);
            }
            sleep(self.config.poll_interval).await;
        }
    }

    async fn poll_receipt(
        &self,
        tx: &TransactionId,
        required: u64,
    ) -> Result<Option<(TransactionStatus, Option<u64>)>, LedgerError> {
        let receipt: Option<TransactionReceipt> = self
            .node
            .call("eth_getTransactionReceipt", json!([tx.to_string()]))
            .await?;
        let Some(receipt) = receipt else {
            return Ok(None);
        };

        let gas_used = receipt.gas_used.as_deref().map(parse_quantity).transpose()?;
        let Some(block) = receipt.block_number.as_deref().map(parse_quantity).transpose()? else {
            return Ok(None);
        };

        if receipt.status.as_deref() == Some("0x0") {
            return Ok(Some((
                TransactionStatus::Failed {
                    error: "execution reverted".to_string(),
                },
                gas_used,
            )));
        }

        let head: String = self.node.call("eth_blockNumber", json!([])).await?;
        let head = parse_quantity(&head)?;
        let confirmations = head.saturating_sub(block) + 1;
        if confirmations >= required {
            return Ok(Some((
                TransactionStatus::Confirmed {
                    block_height: block,
                },
                gas_used,
            )));
        }

        tracing::trace!(tx = %tx, confirmations, required, "Waiting for confirmations");
        Ok(None)
    }
}

#[async_trait]
impl StatsReader for EvmLedgerClient {
    async fn read_stats(&self, player: &Address) -> Result<LedgerStats, LedgerError> {
        self.ensure_network(&self.node).await?;
        let raw = self.eth_call(stats_ledger::get_stats(player)).await?;
        let mut stats = stats_ledger::decode_stats(&raw)?;

        let raw = self.eth_call(stats_ledger::get_win_percentage(player)).await?;
        stats.win_percentage = stats_ledger::decode_win_percentage(&raw)?;

        tracing::debug!(
            player = %player.short(6, 4),
            total = stats.total_games,
            nonce = stats.nonce,
            "Read ledger stats"
        );
        Ok(stats)
    }

    async fn read_nonce(&self, player: &Address) -> Result<u64, LedgerError> {
        self.ensure_network(&self.node).await?;
        let raw = self.eth_call(stats_ledger::get_nonce(player)).await?;
        stats_ledger::decode_u64(&raw)
    }

    async fn read_win_percentage(&self, player: &Address) -> Result<f64, LedgerError> {
        self.ensure_network(&self.node).await?;
        let raw = self.eth_call(stats_ledger::get_win_percentage(player)).await?;
        stats_ledger::decode_win_percentage(&raw)
    }
}

#[async_trait]
impl StatsSubmitter for EvmLedgerClient {
    async fn estimate_submission_gas(
        &self,
        player: &Address,
        delta: &DeltaSubmission,
    ) -> Result<GasEstimate, LedgerError> {
        let request = self.transaction_request(player, delta);
        let amount = match self.node.call::<String>("eth_estimateGas", json!([request])).await {
            Ok(raw) => buffered_gas(parse_quantity(&raw)?),
            Err(e @ LedgerError::Rejected(_)) => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Gas estimation failed, using fallback limit");
                FALLBACK_GAS_LIMIT
            }
        };

        Ok(GasEstimate {
            amount,
            unit: "gas".to_string(),
        })
    }

    async fn submit_delta(
        &self,
        player: &Address,
        delta: &DeltaSubmission,
    ) -> Result<SubmissionReceipt, LedgerError> {
        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| LedgerError::Config("no wallet endpoint configured".to_string()))?;

        self.ensure_network(wallet).await?;
        self.ensure_contract().await?;

        let gas = self.estimate_submission_gas(player, delta).await?;

        let mut request = self.transaction_request(player, delta);
        request["gas"] = Value::String(to_quantity(gas.amount));

        let raw: String = wallet.call("eth_sendTransaction", json!([request])).await?;
        let transaction_id: TransactionId = raw.parse()?;

        tracing::info!(
            tx = %transaction_id,
            wins = delta.delta_wins,
            losses = delta.delta_losses,
            nonce = delta.expected_nonce,
            "Submitted stats delta"
        );

        let (status, gas_used) = self.wait_for_confirmations(&transaction_id).await;

        Ok(SubmissionReceipt {
            transaction_id,
            status,
            gas_used,
        })
    }
}

impl LedgerClient for EvmLedgerClient {
    fn name(&self) -> &str {
        "evm"
    }

    fn network(&self) -> &str {
        self.config.network_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvmNetwork;

    #[test]
    fn gas_buffer_adds_twenty_percent() {
        assert_eq!(buffered_gas(50_000), 60_000);
        assert_eq!(buffered_gas(0), 0);
    }

    #[test]
    fn client_without_wallet_is_read_only() {
        let client = EvmLedgerClient::new(EvmConfig::new(EvmNetwork::Local)).unwrap();
        assert!(!client.can_submit());
        assert_eq!(client.name(), "evm");
        assert_eq!(client.network(), "evm-local");
    }

    #[tokio::test]
    async fn submit_without_wallet_is_a_config_error() {
        let client = EvmLedgerClient::new(EvmConfig::new(EvmNetwork::Local)).unwrap();
        let player = Address([1; 20]);
        let delta = DeltaSubmission {
            delta_wins: 1,
            delta_losses: 0,
            expected_nonce: 0,
        };
        assert!(matches!(
            client.submit_delta(&player, &delta).await,
            Err(LedgerError::Config(_))
        ));
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = EvmConfig::new(EvmNetwork::Local).with_confirmations(0);
        assert!(matches!(
            EvmLedgerClient::new(config),
            Err(LedgerError::Config(_))
        ));
    }
}
