//! # Contract Call Data
//!
//! Fixed-shape ABI encoding for contract invocations: a 4-byte selector
//! followed by 32-byte argument words. This is the load-bearing contract
//! between Flint and whatever code runs on the other side; a single
//! misplaced pad byte and the contract will cheerfully interpret your
//! transfer as something else entirely.
//!
//! ## What is deliberately missing
//!
//! Dynamic-length types (strings, arrays, `bytes`) use an offset-table
//! encoding this module does not implement. Flint's scope is the
//! fixed-width subset that value transfers and token operations actually
//! use; anything wider than one word is rejected with
//! [`AbiError::UnsupportedArgumentShape`] rather than encoded by guesswork.

use std::fmt;

use primitive_types::U256;
use thiserror::Error;

use crate::config::{ABI_WORD_LENGTH, SELECTOR_LENGTH};
use crate::crypto::hash::keccak256;
use crate::types::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from call-data encoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    /// An argument does not fit the one-word fixed-width model.
    #[error("argument {index} is {width} bytes; fixed-width arguments are at most 32")]
    UnsupportedArgumentShape {
        /// Zero-based position of the offending argument.
        index: usize,
        /// Its actual width in bytes.
        width: usize,
    },
}

// ---------------------------------------------------------------------------
// AbiToken
// ---------------------------------------------------------------------------

/// A single fixed-width argument value.
///
/// Every variant encodes to exactly one 32-byte word: right-aligned,
/// zero-padded on the left, regardless of the value's natural width.
/// A 20-byte address therefore always becomes 12 zero bytes followed by
/// the address bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiToken {
    /// A 20-byte account or contract address.
    Address(Address),
    /// An unsigned integer up to 256 bits.
    Uint(U256),
    /// Raw bytes, at most 32 of them (e.g. a `bytes32` hash argument).
    FixedBytes(Vec<u8>),
}

impl AbiToken {
    /// Encode this token into its 32-byte word.
    ///
    /// Fails only for [`AbiToken::FixedBytes`] wider than a word; the
    /// other variants cannot be oversized by construction.
    fn to_word(&self, index: usize) -> Result<[u8; 32], AbiError> {
        let mut word = [0u8; ABI_WORD_LENGTH];
        match self {
            AbiToken::Address(addr) => {
                word[12..].copy_from_slice(addr.as_bytes());
            }
            AbiToken::Uint(value) => {
                value.to_big_endian(&mut word);
            }
            AbiToken::FixedBytes(bytes) => {
                if bytes.len() > ABI_WORD_LENGTH {
                    return Err(AbiError::UnsupportedArgumentShape {
                        index,
                        width: bytes.len(),
                    });
                }
                word[ABI_WORD_LENGTH - bytes.len()..].copy_from_slice(bytes);
            }
        }
        Ok(word)
    }
}

// ---------------------------------------------------------------------------
// CallData
// ---------------------------------------------------------------------------

/// The opaque payload of a contract invocation.
///
/// Invariant: `selector` is always the first 4 bytes of
/// `keccak256(canonical_function_signature)`. There is no constructor that
/// takes a raw selector, which is exactly the point: you cannot produce a
/// `CallData` whose selector and signature disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallData {
    selector: [u8; SELECTOR_LENGTH],
    words: Vec<[u8; ABI_WORD_LENGTH]>,
}

impl CallData {
    /// Encode a call to `signature` with the given arguments.
    ///
    /// `signature` must be the *canonical* form, e.g.
    /// `"transfer(address,uint256)"`: no spaces, no parameter names, no
    /// aliases like `uint` for `uint256`. The selector is a hash of these
    /// exact bytes; this function performs no normalization because any
    /// normalization it guessed at would silently target a different
    /// function.
    ///
    /// Arguments are encoded in declaration order, one word each.
    pub fn encode(signature: &str, args: &[AbiToken]) -> Result<Self, AbiError> {
        let digest = keccak256(signature.as_bytes());
        let mut selector = [0u8; SELECTOR_LENGTH];
        selector.copy_from_slice(&digest[..SELECTOR_LENGTH]);

        let words = args
            .iter()
            .enumerate()
            .map(|(index, token)| token.to_word(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { selector, words })
    }

    /// The canonical `transfer(address,uint256)` call, because it is the
    /// one contract call everyone ends up making. Infallible: both
    /// argument shapes are fixed-width by construction.
    pub fn erc20_transfer(recipient: Address, amount: U256) -> Self {
        let digest = keccak256(b"transfer(address,uint256)");
        let mut selector = [0u8; SELECTOR_LENGTH];
        selector.copy_from_slice(&digest[..SELECTOR_LENGTH]);

        let mut address_word = [0u8; ABI_WORD_LENGTH];
        address_word[12..].copy_from_slice(recipient.as_bytes());
        let mut amount_word = [0u8; ABI_WORD_LENGTH];
        amount.to_big_endian(&mut amount_word);

        Self {
            selector,
            words: vec![address_word, amount_word],
        }
    }

    /// The 4-byte function selector.
    pub fn selector(&self) -> [u8; SELECTOR_LENGTH] {
        self.selector
    }

    /// The encoded argument words, in declaration order.
    pub fn words(&self) -> &[[u8; ABI_WORD_LENGTH]] {
        &self.words
    }

    /// Flatten to the wire payload: selector followed by the concatenated
    /// words. This is what lands in a transaction's `payload` field.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(SELECTOR_LENGTH + self.words.len() * ABI_WORD_LENGTH);
        out.extend_from_slice(&self.selector);
        for word in &self.words {
            out.extend_from_slice(word);
        }
        out
    }
}

impl fmt::Display for CallData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_bytes()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
