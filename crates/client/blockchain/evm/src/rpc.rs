//! Minimal Ethereum JSON-RPC transport over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use client_blockchain_core::LedgerError;

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// JSON-RPC client bound to one endpoint.
pub struct JsonRpcClient {
    url: String,
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Calls `method`, mapping node and wallet errors onto [`LedgerError`].
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::trace!(method, url = %self.url, "JSON-RPC request");

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Network(format!("{method} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LedgerError::Network(format!(
                "{method} failed with status {status}: {error_text}"
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(format!("{method}: {e}")))?;

        if let Some(error) = body.error {
            return Err(map_rpc_error(error.code, &error.message, error.data.as_ref()));
        }

        let result = body.result.unwrap_or(Value::Null);
        serde_json::from_value(result)
            .map_err(|e| LedgerError::MalformedResponse(format!("{method} result: {e}")))
    }
}

/// Maps a JSON-RPC error object onto the ledger error taxonomy.
pub fn map_rpc_error(code: i64, message: &str, data: Option<&Value>) -> LedgerError {
    let detail = data
        .and_then(Value::as_str)
        .map(|d| format!("{message} {d}"))
        .unwrap_or_else(|| message.to_string());
    let lower = detail.to_lowercase();

    if code == 4001 || lower.contains("user rejected") || detail.contains("ACTION_REJECTED") {
        return LedgerError::UserRejected;
    }
    if lower.contains("insufficient funds") {
        return LedgerError::InsufficientFunds;
    }
    if detail.contains("INVALID_NONCE") {
        return LedgerError::Rejected("invalid nonce".to_string());
    }
    if code == 3 || lower.contains("execution reverted") {
        return LedgerError::Rejected(detail);
    }
    if code == -32603 {
        return LedgerError::Network(detail);
    }
    LedgerError::Backend(format!("{code}: {detail}"))
}

/// Parses a hex quantity such as `"0x2105"`.
pub fn parse_quantity(value: &str) -> Result<u64, LedgerError> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::MalformedResponse(format!("not a hex quantity: {value}")))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| LedgerError::MalformedResponse(format!("bad quantity {value}: {e}")))
}

pub fn to_quantity(value: u64) -> String {
    format!("0x{value:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_errors_are_classified() {
        assert_eq!(
            map_rpc_error(4001, "User denied transaction signature", None),
            LedgerError::UserRejected
        );
        assert_eq!(
            map_rpc_error(-32000, "insufficient funds for gas * price + value", None),
            LedgerError::InsufficientFunds
        );
        assert_eq!(
            map_rpc_error(3, "execution reverted: INVALID_NONCE", None),
            LedgerError::Rejected("invalid nonce".to_string())
        );
        assert!(matches!(
            map_rpc_error(-32603, "Internal JSON-RPC error.", None),
            LedgerError::Network(_)
        ));
        assert!(matches!(
            map_rpc_error(-32601, "method not found", None),
            LedgerError::Backend(_)
        ));
    }

    #[test]
    fn revert_reason_in_data_is_kept() {
        let data = Value::String("BATCH_TOO_LARGE".into());
        match map_rpc_error(3, "execution reverted", Some(&data)) {
            LedgerError::Rejected(reason) => assert!(reason.contains("BATCH_TOO_LARGE")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn quantities_parse() {
        assert_eq!(parse_quantity("0x2105").unwrap(), 8453);
        assert_eq!(parse_quantity("0x").unwrap(), 0);
        assert!(parse_quantity("2105").is_err());
        assert_eq!(to_quantity(100_000), "0x186a0");
    }
}
