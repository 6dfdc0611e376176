//! # Hashing
//!
//! Keccak-256 and nothing else. Ethereum settled on the original Keccak
//! submission (not the padded FIPS-202 SHA3-256 variant) before the ink on
//! the standard was dry, and every address, selector, signing hash, and
//! transaction id on the network depends on that exact choice. Using
//! `Sha3_256` here instead of `Keccak256` produces digests that look just
//! as random and are completely wrong. Ask anyone who has debugged it.
//!
//! All functions are pure and allocation-light. For composite inputs use
//! [`keccak256_multi`] instead of concatenating into a temporary buffer.

use sha3::{Digest, Keccak256};

/// Compute the Keccak-256 hash of the input data.
///
/// Returns the 32-byte digest as a fixed-size array. This is the hash that
/// underlies everything Flint produces: account addresses, function
/// selectors, EIP-155 signing hashes, and transaction ids.
///
/// # Example
///
/// ```
/// use flint_wallet::crypto::keccak256;
///
/// let digest = keccak256(b"transfer(address,uint256)");
/// assert_eq!(&digest[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
/// ```
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Feeding the parts sequentially into the hasher gives the same digest as
/// hashing their concatenation, minus the temporary allocation. Useful for
/// composite pre-images like `(prefix || payload)`.
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}
