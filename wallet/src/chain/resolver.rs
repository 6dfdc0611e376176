//! Sequence-number and fee-rate resolution.
//!
//! Thin by design. The resolver adds no caching and no local counter on
//! top of the node's answer: a cached sequence number is a stale sequence
//! number the moment anything else submits for the account, and the
//! serialization that actually prevents collisions lives in
//! [`crate::chain::sender::TransactionSender`], where the critical
//! section spans all the way through submission.

use std::sync::Arc;

use primitive_types::U256;
use tracing::debug;

use super::client::{ChainClient, RpcError};
use crate::types::Address;

/// Resolves the next sequence number and a suggested fee rate for a
/// sender, straight from chain state.
#[derive(Clone)]
pub struct FeeAndNonceResolver {
    client: Arc<dyn ChainClient>,
}

impl FeeAndNonceResolver {
    /// Wrap a chain client.
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self { client }
    }

    /// The next valid sequence number for `account`: its transaction
    /// count including pending entries.
    ///
    /// Call this at most once per transaction being built, inside the
    /// per-account critical section. Two unserialized calls can hand the
    /// same number to two transactions, and the node will keep exactly
    /// one of them.
    ///
    /// # Errors
    ///
    /// [`RpcError::Unavailable`] on transport failure. Not retried here:
    /// by the time a retry fires, the right answer may have changed.
    pub async fn next_sequence(&self, account: Address) -> Result<u64, RpcError> {
        let sequence = self.client.pending_transaction_count(account).await?;
        debug!(account = %account, sequence, "resolved next sequence");
        Ok(sequence)
    }

    /// The node's fee-rate suggestion in wei. Purely informational;
    /// callers with stronger opinions (or a fee market model) may ignore
    /// it entirely.
    pub async fn suggested_fee_rate(&self) -> Result<U256, RpcError> {
        let rate = self.client.suggested_fee_rate().await?;
        debug!(rate = %rate, "resolved suggested fee rate");
        Ok(rate)
    }
}
