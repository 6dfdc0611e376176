//! # Cryptographic Primitives
//!
//! Keypair management and hashing. Everything in here is a thin, opinionated
//! wrapper over audited implementations (`k256`, `sha3`); the wrappers exist
//! to make misuse hard, not to be clever.

pub mod hash;
pub mod keys;

pub use hash::{keccak256, keccak256_multi};
pub use keys::{KeyError, Keypair};
