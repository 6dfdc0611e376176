// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Flint — Core Library
//!
//! Flint builds, signs, and broadcasts Ethereum-compatible transactions
//! without trusting anyone else's machine with your keys. Everything that
//! touches key material or wire bytes happens locally; the only thing the
//! network ever sees is a fully signed, replay-protected byte string.
//!
//! Flint takes a pragmatic stance: secp256k1 with RFC 6979 deterministic
//! nonces for signatures (because a broken RNG at signing time should not
//! be able to leak your key), Keccak-256 for hashing (because that is what
//! the chain speaks, like it or not), and a hand-rolled, strictly canonical
//! RLP codec (because "roughly RLP" is how people lose funds).
//!
//! ## Architecture
//!
//! The crate is split into modules that mirror the lifecycle of a
//! transaction:
//!
//! - **crypto** — Keypairs and Keccak-256. Don't roll your own curve.
//! - **types** — Addresses and transaction ids. Twenty bytes of identity.
//! - **rlp** — The canonical byte encoding. Signing and wire, one codec.
//! - **abi** — Fixed-shape contract call data. Selectors and 32-byte words.
//! - **transaction** — Construction, encoding, and EIP-155 signing.
//! - **chain** — The RPC boundary: sequence numbers, fee rates, broadcast.
//! - **config** — Chain ids, units, and every other magic number.
//!
//! ## Design Philosophy
//!
//! 1. Nothing is mutated after construction. Every step returns a new value.
//! 2. No `unwrap()` outside tests. Failures are typed and carry context.
//! 3. Signing is deterministic. Same transaction, same key, same bytes.
//! 4. If it produces wire bytes, it has a pinned test vector.

pub mod abi;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod rlp;
pub mod transaction;
pub mod types;

pub use abi::{AbiToken, CallData};
pub use chain::broadcaster::Broadcaster;
pub use chain::client::{ChainClient, HttpChainClient, Receipt, ReceiptStatus, RpcError};
pub use chain::resolver::FeeAndNonceResolver;
pub use chain::sender::{TransactionSender, TransferIntent};
pub use crypto::keys::Keypair;
pub use transaction::builder::TransactionBuilder;
pub use transaction::signing::sign;
pub use transaction::types::{SignaturePayload, SignedTransaction, UnsignedTransaction};
pub use types::{Address, TransactionId};
