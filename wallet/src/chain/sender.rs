//! The end-to-end send pipeline with per-account serialization.
//!
//! ## The race this module exists to close
//!
//! A sequence number fetched from the node is only valid until the next
//! submission for the same account. Two concurrent builds that both ask
//! "what's my next sequence number?" before either submits will get the
//! same answer, sign two different transactions with it, and the node
//! will keep exactly one. In the best case the loser is rejected; in the
//! worst it silently replaces the winner in the pending pool.
//!
//! [`TransactionSender`] makes the critical section explicit: one
//! `Mutex` per sender account, held from sequence acquisition all the way
//! through submission, across every suspension point in between.
//! Different accounts have independent sequence spaces and proceed in
//! parallel; only same-account pipelines queue.
//!
//! There is no retry logic in here. A failed send releases the lock and
//! reports; any caller that retries must go through the pipeline again,
//! which re-fetches the sequence number under a fresh lock.

use std::sync::Arc;

use dashmap::DashMap;
use primitive_types::U256;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::broadcaster::Broadcaster;
use super::client::{ChainClient, RpcError};
use super::resolver::FeeAndNonceResolver;
use crate::crypto::keys::Keypair;
use crate::transaction::builder::{IntentError, TransactionBuilder};
use crate::transaction::signing::{sign, SignError};
use crate::types::{Address, TransactionId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures from the composed pipeline. Each wrapped error keeps its own
/// type; flattening them into strings would throw away exactly the
/// discrimination callers branch on.
#[derive(Debug, Error)]
pub enum SendError {
    /// The caller's intent failed builder validation.
    #[error(transparent)]
    Intent(#[from] IntentError),

    /// Signing failed (theoretical for a well-formed keypair).
    #[error(transparent)]
    Signing(#[from] SignError),

    /// The chain boundary failed: transport or rejection.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

// ---------------------------------------------------------------------------
// TransferIntent
// ---------------------------------------------------------------------------

/// What the caller wants to send, before the resolver fills in sequence
/// number and (optionally) fee rate.
#[derive(Debug, Clone)]
pub struct TransferIntent {
    /// Destination, or `None` for contract creation.
    pub recipient: Option<Address>,
    /// Amount in wei.
    pub value: U256,
    /// Fee budget in fee units.
    pub fee_limit: u64,
    /// Fee rate override in wei. `None` means "ask the node".
    pub fee_rate: Option<U256>,
    /// Call data or init code; empty for a plain transfer.
    pub payload: Vec<u8>,
}

impl TransferIntent {
    /// A plain value transfer with the node's suggested fee rate.
    pub fn transfer(recipient: Address, value: U256, fee_limit: u64) -> Self {
        Self {
            recipient: Some(recipient),
            value,
            fee_limit,
            fee_rate: None,
            payload: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionSender
// ---------------------------------------------------------------------------

/// Composes resolver → builder → signer → broadcaster under a per-account
/// lock.
pub struct TransactionSender {
    resolver: FeeAndNonceResolver,
    broadcaster: Broadcaster,
    /// One lock per sender account, created on first use and kept for the
    /// sender's lifetime. The value is an `Arc` so the guard can outlive
    /// the map shard access.
    account_locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl TransactionSender {
    /// Build a sender over a shared chain client.
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self {
            resolver: FeeAndNonceResolver::new(Arc::clone(&client)),
            broadcaster: Broadcaster::new(client),
            account_locks: DashMap::new(),
        }
    }

    /// Run the full pipeline for one transaction.
    ///
    /// Holds the sender account's lock from `next_sequence` through
    /// `submit`, so two concurrent calls for the same keypair cannot be
    /// assigned the same sequence number no matter how their awaits
    /// interleave. Calls for different keypairs share nothing and run
    /// concurrently.
    pub async fn send(
        &self,
        keypair: &Keypair,
        chain_id: u64,
        intent: TransferIntent,
    ) -> Result<TransactionId, SendError> {
        let account = keypair.address();
        let lock = self.lock_for(account);
        let _guard = lock.lock().await;
        debug!(account = %account, "entered per-account critical section");

        let sequence = self.resolver.next_sequence(account).await?;
        let fee_rate = match intent.fee_rate {
            Some(rate) => rate,
            None => self.resolver.suggested_fee_rate().await?,
        };

        let mut builder = TransactionBuilder::new()
            .sequence(sequence)
            .value(intent.value)
            .fee_limit(intent.fee_limit)
            .fee_rate(fee_rate)
            .payload(intent.payload);
        if let Some(recipient) = intent.recipient {
            builder = builder.recipient(recipient);
        }
        let tx = builder.build()?;

        let stx = sign(&tx, keypair, chain_id)?;
        let id = self.broadcaster.submit(&stx).await?;
        Ok(id)
        // _guard drops here; the next build for this account may begin.
    }

    /// Fetch or create the lock for an account. The map guard is dropped
    /// before the caller awaits on the mutex; holding a dashmap shard
    /// across a suspension point would serialize unrelated accounts.
    fn lock_for(&self, account: Address) -> Arc<Mutex<()>> {
        let entry = self.account_locks.entry(account).or_default();
        Arc::clone(&entry)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
