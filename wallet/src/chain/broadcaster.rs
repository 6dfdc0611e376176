//! Signed-transaction broadcast.
//!
//! The broadcaster owns one invariant: the transaction id is
//! `keccak256(wire_bytes)` computed *here*, not whatever the remote side
//! echoes back. A node that returns a different id is either buggy or
//! lying, and both deserve a warning in the log rather than silent trust.

use std::sync::Arc;

use tracing::{info, warn};

use super::client::{ChainClient, RpcError};
use crate::transaction::types::SignedTransaction;
use crate::types::TransactionId;

/// Hands signed wire bytes to the chain and reports the transaction id.
#[derive(Clone)]
pub struct Broadcaster {
    client: Arc<dyn ChainClient>,
}

impl Broadcaster {
    /// Wrap a chain client.
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self { client }
    }

    /// Encode and submit a signed transaction.
    ///
    /// Returns the locally computed id. The remote echo is compared and
    /// logged on mismatch but never returned; callers verify against the
    /// value this function gives them.
    ///
    /// # Errors
    ///
    /// [`RpcError::Unavailable`] for transport failure,
    /// [`RpcError::Rejected`] with the node's uninterpreted reason for a
    /// remote refusal (stale sequence number, insufficient balance, fee
    /// below floor). No retries: after a transport failure the
    /// transaction may have landed anyway, so a blind resubmit is how
    /// duplicates happen.
    pub async fn submit(&self, stx: &SignedTransaction) -> Result<TransactionId, RpcError> {
        let raw = stx.to_wire_bytes();
        let local_id = stx.id();

        let remote_id = self.client.submit_raw_transaction(&raw).await?;
        if remote_id != local_id {
            warn!(
                local = %local_id,
                remote = %remote_id,
                "remote node echoed a different transaction id"
            );
        }

        info!(
            id = %local_id,
            sequence = stx.transaction.sequence,
            bytes = raw.len(),
            "transaction submitted"
        );
        Ok(local_id)
    }
}
