//! # Key Management
//!
//! secp256k1 keypair generation and account address derivation.
//!
//! Every transaction Flint signs traces back to one of these. The design
//! goal is simple: a [`Keypair`] that exists is valid. The constructors are
//! the only gate, and they reject anything that is not a well-formed
//! secp256k1 secret scalar, so the rest of the crate never has to ask
//! "is this really a key?" at runtime.
//!
//! ## Security considerations
//!
//! - Key generation pulls from the OS CSPRNG (`OsRng`). If that is broken,
//!   Flint keys are the least of your worries.
//! - Secret bytes are never logged and never appear in error messages.
//!   If you add logging to this module, you will be asked to leave.
//! - Serialization of secret material is a deliberate, explicit act
//!   (`secret_key_hex`), never something serde does behind your back.

use std::fmt;

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

use crate::config::SECRET_KEY_LENGTH;
use crate::crypto::hash::keccak256;
use crate::types::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during key construction.
///
/// The messages are intentionally vague about *what* the bytes were.
/// Leaking key material through error strings is a classic footgun.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The input is not a valid secret key encoding.
    #[error("invalid secret key encoding: {reason}")]
    InvalidEncoding {
        /// What was wrong with the shape of the input (never its content).
        reason: &'static str,
    },

    /// The operating system's randomness source failed. This is either a
    /// catastrophically misconfigured host or a very bad day.
    #[error("operating system randomness source failed")]
    Entropy,
}

// ---------------------------------------------------------------------------
// Keypair
// ---------------------------------------------------------------------------

/// A secp256k1 signing keypair and the root of an on-chain identity.
///
/// The account address is a pure function of the public key: the last
/// 20 bytes of `keccak256` over the uncompressed public point with its
/// SEC1 tag byte removed. Two calls to [`Keypair::address`] can never
/// disagree.
///
/// # Examples
///
/// ```
/// use flint_wallet::crypto::keys::Keypair;
///
/// let kp = Keypair::from_hex(
///     "fad9c8855b740a0b7ed4c221dbad0f33a83a49cad6b3fe8d5817ac83d38b6a19",
/// )
/// .unwrap();
/// assert_eq!(
///     kp.address().to_checksum_string(),
///     "0x96216849c49358B10257cb55b28eA603c874b05E",
/// );
/// ```
pub struct Keypair {
    /// The secret scalar. 32 bytes of pure responsibility.
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a fresh keypair from the OS cryptographic RNG.
    ///
    /// # Errors
    ///
    /// [`KeyError::Entropy`] if the OS randomness source fails outright.
    /// The retry loop below handles the other theoretical failure, random
    /// bytes landing outside the scalar range, which has probability
    /// around 2^-128 per draw and will not happen in the lifetime of this
    /// universe. The loop exists so the code is total, not because we
    /// expect to go around it.
    pub fn generate() -> Result<Self, KeyError> {
        let mut seed = [0u8; SECRET_KEY_LENGTH];
        loop {
            OsRng
                .try_fill_bytes(&mut seed)
                .map_err(|_| KeyError::Entropy)?;
            if let Ok(signing_key) = SigningKey::from_slice(&seed) {
                return Ok(Self { signing_key });
            }
        }
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    ///
    /// The input must be exactly 64 hex characters (an optional `0x`
    /// prefix is tolerated), and must decode to a scalar in `[1, n)` for
    /// the secp256k1 group order `n`. Zero and out-of-range scalars are
    /// not keys and are rejected, not clamped.
    pub fn from_hex(secret_hex: &str) -> Result<Self, KeyError> {
        let stripped = secret_hex.strip_prefix("0x").unwrap_or(secret_hex);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidEncoding {
            reason: "not valid hex",
        })?;
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidEncoding {
                reason: "must be exactly 32 bytes",
            });
        }
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|_| KeyError::InvalidEncoding {
                reason: "scalar is zero or exceeds the curve order",
            })?;
        Ok(Self { signing_key })
    }

    /// Derive the account address for this keypair.
    ///
    /// `keccak256(uncompressed_pubkey[1..])[12..]`: hash the 64-byte
    /// public point (tag byte dropped), keep the last 20 bytes. Pure,
    /// deterministic, no side effects.
    pub fn address(&self) -> Address {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address::from_bytes(out)
    }

    /// The uncompressed SEC1 public key (65 bytes, `0x04` tag included),
    /// hex-encoded. Safe to share, log, print on a t-shirt.
    pub fn public_key_hex(&self) -> String {
        hex::encode(
            self.signing_key
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes(),
        )
    }

    /// Export the secret scalar as hex.
    ///
    /// **Handle with extreme care.** This is the only secret standing
    /// between an attacker and everything the address owns. Don't log it,
    /// don't ship it over the network in plaintext, don't paste it into a
    /// chat to "quickly check something".
    pub fn secret_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// The verifying (public) key, for signature recovery checks.
    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }

    /// Reference to the underlying `SigningKey` for code that talks
    /// directly to `k256`. Try not to pass this around more than the
    /// signing module already does.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl Clone for Keypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a secret key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret material in debug output. Not even "partially".
        // A partial leak is still a leak, and grepping logs for hex is trivial.
        write!(f, "Keypair(address={})", self.address())
    }
}

impl PartialEq for Keypair {
    /// Two keypairs are equal if their public keys match. Comparing secret
    /// material in a non-constant-time way is a bad habit, and for identity
    /// purposes the public half is what matters.
    fn eq(&self, other: &Self) -> bool {
        self.signing_key.verifying_key() == other.signing_key.verifying_key()
    }
}

impl Eq for Keypair {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
