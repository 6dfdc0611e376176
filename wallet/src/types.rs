//! Core value types: account addresses and transaction identifiers.
//!
//! Both are fixed-size byte newtypes with byte-exact equality. They exist
//! so that a 20-byte address and a 32-byte transaction id can never be
//! confused for each other, or for any other blob of hex that happens to
//! be passing through.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::crypto::hash::keccak256;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from parsing an address or transaction id out of a hex string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input decodes to the wrong number of bytes.
    #[error("expected {expected} bytes, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// The input contains non-hex characters.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The input is mixed-case but does not match its EIP-55 checksum.
    #[error("checksum mismatch for address {0}")]
    BadChecksum(String),
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account identifier.
///
/// Derived from a public key as the last 20 bytes of
/// `keccak256(uncompressed_pubkey[1..])`. Equality is byte-exact and the
/// value is never mutated; re-deriving from the same key always yields the
/// same address.
///
/// `Display` renders the EIP-55 mixed-case checksum form. Parsing accepts
/// all-lowercase and all-uppercase hex unconditionally, but a mixed-case
/// string must carry a *valid* checksum; a mangled checksum almost always
/// means a mangled address, and we refuse to guess.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Wrap raw address bytes. No validation is possible on 20 opaque
    /// bytes, so there is nothing to fail.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Try to build an address from a byte slice of any length.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, ParseError> {
        let bytes: [u8; 20] = slice.try_into().map_err(|_| ParseError::InvalidLength {
            expected: 20,
            got: slice.len(),
        })?;
        Ok(Self(bytes))
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex without the `0x` prefix. The form used inside
    /// checksum computation and anywhere case is irrelevant.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// EIP-55 mixed-case checksum rendering, `0x`-prefixed.
    ///
    /// Each alphabetic hex digit is uppercased iff the corresponding nibble
    /// of `keccak256(lowercase_hex)` is >= 8. The result encodes a parity
    /// check into the casing itself, catching single-character typos
    /// without any extra bytes on the wire.
    pub fn to_checksum_string(&self) -> String {
        let lower = self.to_hex();
        let digest = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (digest[i / 2] >> (4 * (1 - i % 2))) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        let addr = Self::try_from_slice(&bytes)?;

        // Mixed-case input claims to carry an EIP-55 checksum; hold it to
        // that claim. Uniform-case input makes no claim and passes.
        let has_lower = stripped.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = stripped.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            let expected = addr.to_checksum_string();
            if expected[2..] != *stripped {
                return Err(ParseError::BadChecksum(s.to_string()));
            }
        }
        Ok(addr)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum_string())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// A 32-byte transaction identifier: `keccak256` of the signed wire
/// encoding, always computed locally. The remote side echoes an id back on
/// submission; we compare but never adopt it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId([u8; 32]);

impl TransactionId {
    /// Wrap a raw 32-byte id.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Try to build an id from a byte slice of any length.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, ParseError> {
        let bytes: [u8; 32] = slice.try_into().map_err(|_| ParseError::InvalidLength {
            expected: 32,
            got: slice.len(),
        })?;
        Ok(Self(bytes))
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex, the form every explorer and node
    /// expects.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl FromStr for TransactionId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.to_hex())
    }
}

impl Serialize for TransactionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "0x4592d8f8d7b001e72cb26a73e4fa1806a51ac79d";

    #[test]
    fn address_parses_lowercase() {
        let addr: Address = RECIPIENT.parse().unwrap();
        assert_eq!(addr.to_hex(), &RECIPIENT[2..]);
    }

    #[test]
    fn address_checksum_known_vector() {
        let addr: Address = RECIPIENT.parse().unwrap();
        assert_eq!(
            addr.to_checksum_string(),
            "0x4592D8f8D7B001e72Cb26A73e4Fa1806a51aC79d"
        );
    }

    #[test]
    fn address_accepts_valid_checksum() {
        let addr: Address = "0x4592D8f8D7B001e72Cb26A73e4Fa1806a51aC79d".parse().unwrap();
        assert_eq!(addr.to_hex(), &RECIPIENT[2..]);
    }

    #[test]
    fn address_rejects_bad_checksum() {
        // Same address with two letters' cases swapped. A uniform-case
        // string would pass; a mixed-case one must checksum.
        let err = "0x4592d8f8D7B001e72Cb26A73e4Fa1806a51aC79d"
            .parse::<Address>()
            .unwrap_err();
        assert!(matches!(err, ParseError::BadChecksum(_)));
    }

    #[test]
    fn address_rejects_wrong_length() {
        let err = "0xdeadbeef".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLength {
                expected: 20,
                got: 4
            }
        );
    }

    #[test]
    fn address_rejects_non_hex() {
        assert!(matches!(
            "0xzz92d8f8d7b001e72cb26a73e4fa1806a51ac79d".parse::<Address>(),
            Err(ParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn address_display_uses_checksum() {
        let addr: Address = RECIPIENT.parse().unwrap();
        assert_eq!(
            format!("{}", addr),
            "0x4592D8f8D7B001e72Cb26A73e4Fa1806a51aC79d"
        );
    }

    #[test]
    fn address_serde_roundtrip() {
        let addr: Address = RECIPIENT.parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    #[test]
    fn transaction_id_hex_roundtrip() {
        let id = TransactionId::from_bytes([0xab; 32]);
        let parsed: TransactionId = id.to_hex().parse().unwrap();
        assert_eq!(id, parsed);
        assert!(id.to_hex().starts_with("0x"));
        assert_eq!(id.to_hex().len(), 66);
    }

    #[test]
    fn transaction_id_rejects_wrong_length() {
        let err = "0xabcd".parse::<TransactionId>().unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLength {
                expected: 32,
                got: 2
            }
        );
    }
}
