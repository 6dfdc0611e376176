//! Transaction value types.
//!
//! Three types, one per lifecycle stage, all immutable after construction.
//! The progression only moves forward: an `UnsignedTransaction` plus a
//! signature makes a `SignedTransaction`, and nothing ever goes back.
//! That one-way street is what keeps "reused a sequence number by
//! accident" and "re-signed with the wrong chain id" out of the bug
//! tracker.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::config::EIP155_V_OFFSET;
use crate::crypto::hash::keccak256;
use crate::types::{Address, TransactionId};

// ---------------------------------------------------------------------------
// UnsignedTransaction
// ---------------------------------------------------------------------------

/// A fully specified transaction that has not been signed yet.
///
/// Produced by [`crate::transaction::builder::TransactionBuilder`];
/// consumed by the encoder and the signer. `recipient = None` denotes
/// contract creation, where the payload carries the initialization code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Per-sender sequence number (the chain calls this a nonce). Strictly
    /// increasing; the network rejects gaps backwards and queues gaps
    /// forwards.
    pub sequence: u64,

    /// Destination account, or `None` for contract creation.
    pub recipient: Option<Address>,

    /// Amount transferred, in wei.
    pub value: U256,

    /// Maximum fee units this transaction may consume. 21000 for a plain
    /// transfer, more for anything that executes code.
    pub fee_limit: u64,

    /// Price per fee unit, in wei.
    pub fee_rate: U256,

    /// Opaque payload: contract call data, initialization code, or empty
    /// for a plain transfer.
    #[serde(with = "hex_bytes")]
    pub payload: Vec<u8>,
}

impl UnsignedTransaction {
    /// `true` when this transaction creates a contract rather than
    /// addressing an existing account.
    pub fn is_contract_creation(&self) -> bool {
        self.recipient.is_none()
    }
}

// ---------------------------------------------------------------------------
// SignaturePayload
// ---------------------------------------------------------------------------

/// The recoverable signature over a transaction's pre-image, plus the
/// chain id it is bound to.
///
/// The wire-level `v` field is *derived*, never stored:
/// `v = recovery_id + chain_id * 2 + 35`. Storing it would invite the two
/// fields to disagree; deriving it makes disagreement unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePayload {
    /// First half of the ECDSA signature.
    pub r: U256,

    /// Second half of the ECDSA signature, always in low-s form.
    pub s: U256,

    /// Which of the two candidate public keys produced the signature.
    /// Always 0 or 1.
    pub recovery_id: u8,

    /// The network this signature is valid on, and nowhere else.
    pub chain_id: u64,
}

impl SignaturePayload {
    /// The replay-protected `v` value that goes on the wire.
    pub fn v(&self) -> u64 {
        self.recovery_id as u64 + self.chain_id * 2 + EIP155_V_OFFSET
    }
}

// ---------------------------------------------------------------------------
// SignedTransaction
// ---------------------------------------------------------------------------

/// An [`UnsignedTransaction`] plus its [`SignaturePayload`].
///
/// The canonical encoding of this value is the wire payload, and decoding
/// those bytes reproduces an equal `SignedTransaction`. Its id is the
/// Keccak-256 hash of that encoding, computed locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// The transaction body, unchanged by signing.
    pub transaction: UnsignedTransaction,

    /// The signature binding body, key, and chain together.
    pub signature: SignaturePayload,
}

impl SignedTransaction {
    /// The exact byte string a node accepts for this transaction.
    pub fn to_wire_bytes(&self) -> Vec<u8> {
        super::encoding::encode_signed(self)
    }

    /// The transaction id: `keccak256` of the wire bytes. Deterministic,
    /// local, and not negotiable with the remote side.
    pub fn id(&self) -> TransactionId {
        TransactionId::from_bytes(keccak256(&self.to_wire_bytes()))
    }
}

// ---------------------------------------------------------------------------
// serde helpers
// ---------------------------------------------------------------------------

/// Serialize payload bytes as `0x`-prefixed hex. A JSON array of integers
/// is technically correct and practically unreadable.
mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
