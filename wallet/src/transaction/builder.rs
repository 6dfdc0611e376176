//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] enforces a disciplined construction flow:
//! set the fields, call `.build()`, get back a validated
//! [`UnsignedTransaction`] or a typed refusal. The builder does not sign
//! and does not touch the network; sequence numbers and fee rates arrive
//! from [`crate::chain::resolver`] as plain values, which keeps
//! construction testable without keys or a node.

use primitive_types::U256;
use thiserror::Error;

use super::types::UnsignedTransaction;
use crate::types::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Ways a caller's intent can fail to describe a sendable transaction.
///
/// These are local, structural checks only. Whether the account can afford
/// the transfer or the sequence number is still fresh is the network's
/// verdict, delivered at broadcast time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    /// A zero fee limit authorizes no computation at all; not even a plain
    /// transfer can execute inside it.
    #[error("fee_limit must be greater than zero")]
    ZeroFeeLimit,

    /// Contract creation (`recipient = None`) with an empty payload would
    /// deploy nothing and burn the fee doing it.
    #[error("contract creation requires a non-empty payload")]
    CreationWithoutCode,
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`UnsignedTransaction`] values.
///
/// # Usage
///
/// ```
/// use flint_wallet::transaction::builder::TransactionBuilder;
/// use primitive_types::U256;
///
/// let tx = TransactionBuilder::new()
///     .recipient("0x4592d8f8d7b001e72cb26a73e4fa1806a51ac79d".parse().unwrap())
///     .value(U256::from(1_000_000_000_000_000_000u64))
///     .fee_limit(21_000)
///     .fee_rate(U256::from(2_000_000_000u64))
///     .sequence(0)
///     .build()
///     .unwrap();
/// assert!(!tx.is_contract_creation());
/// ```
///
/// Defaults: `sequence` 0, `value` 0, `fee_rate` 0, empty payload, and no
/// recipient. `fee_limit` has no useful default and starts at 0, which
/// `build()` will reject; the omission has to be deliberate to be caught.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    sequence: u64,
    recipient: Option<Address>,
    value: U256,
    fee_limit: u64,
    fee_rate: U256,
    payload: Vec<u8>,
}

impl TransactionBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-sender sequence number. Usually this comes straight
    /// from [`crate::chain::resolver::FeeAndNonceResolver::next_sequence`].
    pub fn sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set the destination account. Not calling this means contract
    /// creation, in which case a payload is mandatory.
    pub fn recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    /// Set the transferred amount in wei.
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the fee budget in fee units.
    pub fn fee_limit(mut self, fee_limit: u64) -> Self {
        self.fee_limit = fee_limit;
        self
    }

    /// Set the price per fee unit in wei.
    pub fn fee_rate(mut self, fee_rate: U256) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// Attach a payload: call data for an invocation, init code for a
    /// creation.
    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Validate and produce the [`UnsignedTransaction`].
    ///
    /// # Errors
    ///
    /// [`IntentError::ZeroFeeLimit`] if no fee budget was set, and
    /// [`IntentError::CreationWithoutCode`] for a recipient-less
    /// transaction with no payload. Whether a *present* recipient is a
    /// contract (and the payload therefore meaningful) is not locally
    /// decidable; that judgment belongs to the node.
    pub fn build(self) -> Result<UnsignedTransaction, IntentError> {
        if self.fee_limit == 0 {
            return Err(IntentError::ZeroFeeLimit);
        }
        if self.recipient.is_none() && self.payload.is_empty() {
            return Err(IntentError::CreationWithoutCode);
        }
        Ok(UnsignedTransaction {
            sequence: self.sequence,
            recipient: self.recipient,
            value: self.value,
            fee_limit: self.fee_limit,
            fee_rate: self.fee_rate,
            payload: self.payload,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
