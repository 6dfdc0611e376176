//! # Transaction Module
//!
//! Construction, canonical encoding, and EIP-155 signing of transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs    — UnsignedTransaction, SignaturePayload, SignedTransaction
//! builder.rs  — Fluent TransactionBuilder with intent validation
//! encoding.rs — Transaction ⇄ RLP mapping (signing pre-image and wire form)
//! signing.rs  — Deterministic recoverable ECDSA over the pre-image hash
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** — [`TransactionBuilder`] assembles an [`UnsignedTransaction`]
//!    from caller intent plus resolver output.
//! 2. **Sign** — [`sign`] hashes the EIP-155 pre-image and produces a
//!    [`SignedTransaction`].
//! 3. **Encode** — [`encoding::encode_signed`] yields the exact wire bytes
//!    a node accepts; the same bytes hash to the transaction id.
//! 4. **Broadcast** — handled by [`crate::chain`], outside this module.
//!
//! ## Design Decisions
//!
//! - Every step returns a new immutable value. There is no `set_signature`
//!   anywhere; a signed transaction that exists was produced by signing.
//! - The signing pre-image includes the chain id with two empty placeholder
//!   fields, so a signature is bound to one network before it even exists.
//! - Signatures use RFC 6979 deterministic nonces: signing the same
//!   transaction with the same key twice yields identical bytes, which
//!   makes the golden-vector tests possible at all.

pub mod builder;
pub mod encoding;
pub mod signing;
pub mod types;

pub use builder::{IntentError, TransactionBuilder};
pub use encoding::{decode, DecodeError, DecodedTransaction};
pub use signing::{recover_signer, sign, SignError};
pub use types::{SignaturePayload, SignedTransaction, UnsignedTransaction};
