//! # Chain Boundary
//!
//! Everything that talks to a remote node lives here, behind the
//! [`client::ChainClient`] trait. The rest of the crate is pure
//! computation; this module is where typed values become JSON-RPC calls
//! and transport failures become typed errors.
//!
//! ## Architecture
//!
//! ```text
//! client.rs      — ChainClient trait, JSON-RPC envelope, HTTP implementation
//! resolver.rs    — Sequence numbers and fee rates from chain state
//! broadcaster.rs — Raw submission with a locally computed transaction id
//! sender.rs      — The per-account serialized build→sign→submit pipeline
//! ```
//!
//! ## Contract with the rest of the crate
//!
//! Every call either returns a typed result or a terminal [`client::RpcError`].
//! There are no retries in here, deliberately: a transient failure on
//! submission may hide a transaction that actually landed, so any retry
//! must re-fetch the sequence number first. That judgment belongs to the
//! caller, not to a loop buried three layers down.

pub mod broadcaster;
pub mod client;
pub mod resolver;
pub mod sender;

pub use broadcaster::Broadcaster;
pub use client::{ChainClient, HttpChainClient, Receipt, ReceiptStatus, RpcError};
pub use resolver::FeeAndNonceResolver;
pub use sender::{SendError, TransactionSender, TransferIntent};
