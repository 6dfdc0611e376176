//! The RPC boundary: trait, JSON-RPC 2.0 envelope, and HTTP client.
//!
//! The core pipeline consumes chain state through exactly four call
//! contracts, captured by [`ChainClient`]. Everything else about the
//! remote side (its retry behavior, its timeouts, its moods) is
//! deliberately out of scope: a call either returns a typed result or a
//! terminal [`RpcError`], and policy lives with the caller.
//!
//! [`HttpChainClient`] is the production implementation, speaking
//! JSON-RPC 2.0 over HTTP to any standard node endpoint. Tests use
//! hand-written stubs instead; the trait is the seam.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Address, TransactionId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures at the chain boundary.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The transport could not complete the call: connection refused,
    /// DNS failure, timeout at the HTTP layer, and friends. Transient in
    /// principle; whether to retry (and re-fetch the sequence number
    /// first) is the caller's decision.
    #[error("rpc transport unavailable: {reason}")]
    Unavailable { reason: String },

    /// The remote node answered and said no. The reason string is passed
    /// through uninterpreted: "nonce too low", "insufficient funds",
    /// whatever the node felt like saying. Terminal for this attempt.
    #[error("rejected by remote node: {reason}")]
    Rejected { reason: String },

    /// The remote node answered with something that is not JSON-RPC as we
    /// know it. Usually a misconfigured endpoint (a load balancer error
    /// page, an HTML captive portal) rather than a real node.
    #[error("malformed rpc response: {reason}")]
    MalformedResponse { reason: String },
}

fn transport(err: reqwest::Error) -> RpcError {
    RpcError::Unavailable {
        reason: err.to_string(),
    }
}

fn malformed(reason: impl Into<String>) -> RpcError {
    RpcError::MalformedResponse {
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Post-inclusion execution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    /// The transaction was included and executed without reverting.
    Success,
    /// The transaction was included but execution failed. The fee is
    /// spent either way; the chain does not do refunds for bad ideas.
    Failure,
}

/// The receipt for an included transaction.
///
/// Flint only carries the execution status. Gas accounting, logs, and
/// bloom filters are real fields on real receipts, but nothing in this
/// crate consumes them and inventing types for unread data helps no one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Whether execution succeeded.
    pub status: ReceiptStatus,
}

// ---------------------------------------------------------------------------
// ChainClient
// ---------------------------------------------------------------------------

/// The four call contracts the pipeline needs from a node.
///
/// Implementations must be safe to share across tasks; the
/// [`crate::chain::sender::TransactionSender`] holds one behind an `Arc`
/// and calls it from concurrent per-account pipelines.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Number of transactions the account has issued, *including* ones
    /// pending in the pool. This count is the next valid sequence number.
    async fn pending_transaction_count(&self, account: Address) -> Result<u64, RpcError>;

    /// The node's current fee-rate suggestion, in wei per fee unit.
    /// Advisory; callers may override.
    async fn suggested_fee_rate(&self) -> Result<U256, RpcError>;

    /// Hand signed wire bytes to the node. Returns the transaction id the
    /// *remote* side computed; callers should compare it against their
    /// locally computed id rather than trust it.
    async fn submit_raw_transaction(&self, raw: &[u8]) -> Result<TransactionId, RpcError>;

    /// Look up the receipt for a transaction. `None` means the node does
    /// not know the transaction or has not included it yet; the two are
    /// indistinguishable from outside.
    async fn transaction_receipt(&self, id: TransactionId) -> Result<Option<Receipt>, RpcError>;
}

// ---------------------------------------------------------------------------
// JSON-RPC envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: &'static str,
    /// Request identifier, echoed back in the response.
    pub id: u64,
    /// Method name, e.g. `"eth_sendRawTransaction"`.
    pub method: &'static str,
    /// Positional parameters.
    pub params: serde_json::Value,
}

/// A JSON-RPC 2.0 response. Exactly one of `result` / `error` is set by a
/// conforming node; we check rather than assume.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    /// Echoed request id. Unused beyond debugging: requests are not
    /// pipelined over a shared connection here.
    #[allow(dead_code)]
    pub id: serde_json::Value,
    /// Successful result payload.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error object on failure.
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// The JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    /// Numeric error code (e.g. -32000 for node-level rejections).
    pub code: i64,
    /// Human-readable message, passed through to [`RpcError::Rejected`].
    pub message: String,
}

// ---------------------------------------------------------------------------
// HttpChainClient
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 over HTTP against a standard node endpoint.
pub struct HttpChainClient {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpChainClient {
    /// Point a client at an endpoint, e.g. `http://127.0.0.1:8545`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// One request, one response, no retries.
    async fn call(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let envelope: RpcResponse = response.json().await.map_err(transport)?;

        if let Some(err) = envelope.error {
            return Err(RpcError::Rejected {
                reason: format!("{} (code {})", err.message, err.code),
            });
        }
        envelope
            .result
            .ok_or_else(|| malformed("response carries neither result nor error"))
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn pending_transaction_count(&self, account: Address) -> Result<u64, RpcError> {
        // The "pending" block tag is load-bearing: counting only mined
        // transactions hands out sequence numbers that collide with
        // in-flight ones.
        let result = self
            .call(
                "eth_getTransactionCount",
                serde_json::json!([format!("0x{}", account.to_hex()), "pending"]),
            )
            .await?;
        quantity_u64(&result)
    }

    async fn suggested_fee_rate(&self) -> Result<U256, RpcError> {
        let result = self.call("eth_gasPrice", serde_json::json!([])).await?;
        quantity_u256(&result)
    }

    async fn submit_raw_transaction(&self, raw: &[u8]) -> Result<TransactionId, RpcError> {
        let result = self
            .call(
                "eth_sendRawTransaction",
                serde_json::json!([format!("0x{}", hex::encode(raw))]),
            )
            .await?;
        let text = result
            .as_str()
            .ok_or_else(|| malformed("transaction id is not a string"))?;
        text.parse()
            .map_err(|_| malformed(format!("transaction id {:?} is not 32 hex bytes", text)))
    }

    async fn transaction_receipt(&self, id: TransactionId) -> Result<Option<Receipt>, RpcError> {
        let result = self
            .call(
                "eth_getTransactionReceipt",
                serde_json::json!([id.to_hex()]),
            )
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let status = result
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| malformed("receipt carries no status field"))?;
        match status {
            "0x1" => Ok(Some(Receipt {
                status: ReceiptStatus::Success,
            })),
            "0x0" => Ok(Some(Receipt {
                status: ReceiptStatus::Failure,
            })),
            other => Err(malformed(format!("unrecognized receipt status {:?}", other))),
        }
    }
}

// ---------------------------------------------------------------------------
// Quantity parsing
// ---------------------------------------------------------------------------

/// Parse a JSON-RPC quantity (`"0x"`-prefixed, minimal hex) as u64.
fn quantity_u64(value: &serde_json::Value) -> Result<u64, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| malformed("quantity is not a string"))?;
    let stripped = text
        .strip_prefix("0x")
        .ok_or_else(|| malformed(format!("quantity {:?} lacks 0x prefix", text)))?;
    u64::from_str_radix(stripped, 16)
        .map_err(|_| malformed(format!("quantity {:?} is not valid hex", text)))
}

/// Parse a JSON-RPC quantity as U256.
fn quantity_u256(value: &serde_json::Value) -> Result<U256, RpcError> {
    let text = value
        .as_str()
        .ok_or_else(|| malformed("quantity is not a string"))?;
    let stripped = text
        .strip_prefix("0x")
        .ok_or_else(|| malformed(format!("quantity {:?} lacks 0x prefix", text)))?;
    U256::from_str_radix(stripped, 16)
        .map_err(|_| malformed(format!("quantity {:?} is not valid hex", text)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_jsonrpc_shape() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_gasPrice",
            params: serde_json::json!([]),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 7);
        assert_eq!(json["method"], "eth_gasPrice");
        assert!(json["params"].as_array().unwrap().is_empty());
    }

    #[test]
    fn response_with_result_deserializes() {
        let envelope: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x5208"}"#).unwrap();
        assert!(envelope.error.is_none());
        assert_eq!(quantity_u64(&envelope.result.unwrap()).unwrap(), 21_000);
    }

    #[test]
    fn response_with_error_deserializes() {
        let envelope: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"nonce too low"}}"#,
        )
        .unwrap();
        let err = envelope.error.unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "nonce too low");
    }

    #[test]
    fn quantity_parsing() {
        assert_eq!(quantity_u64(&serde_json::json!("0x0")).unwrap(), 0);
        assert_eq!(quantity_u64(&serde_json::json!("0x2a")).unwrap(), 42);
        assert_eq!(
            quantity_u256(&serde_json::json!("0x77359400")).unwrap(),
            U256::from(2_000_000_000u64)
        );
    }

    #[test]
    fn quantity_rejects_garbage() {
        assert!(quantity_u64(&serde_json::json!("5208")).is_err());
        assert!(quantity_u64(&serde_json::json!("0xzz")).is_err());
        assert!(quantity_u64(&serde_json::json!(42)).is_err());
    }

    #[test]
    fn rejected_error_carries_reason() {
        let err = RpcError::Rejected {
            reason: "insufficient funds for gas * price + value".to_string(),
        };
        assert!(err.to_string().contains("insufficient funds"));
    }
}
