//! Transaction ⇄ RLP mapping.
//!
//! One field order, three closely related encodings:
//!
//! - **Unsigned** (6 fields): `[sequence, fee_rate, fee_limit, recipient,
//!   value, payload]`. Exists so an unsigned transaction can round-trip
//!   through storage or an offline signer.
//! - **Signing pre-image** (9 fields): the six above plus
//!   `[chain_id, "", ""]`. The two empty placeholders are not decoration;
//!   hashing the chain id *in the exact position the signature will later
//!   occupy* is what makes an EIP-155 signature unreplayable on another
//!   network.
//! - **Signed wire form** (9 fields): the six plus `[v, r, s]`. These are
//!   the bytes a node accepts and the bytes the transaction id is hashed
//!   from.
//!
//! `decode` inverts the unsigned and signed forms (the pre-image is
//! recognizable but deliberately not reconstructed into a transaction; it
//! exists to be hashed, not stored). The round-trip law
//! `decode(encode(x)) == x` holds for every valid value and is enforced
//! by the strict RLP layer underneath: non-minimal integers, sloppy
//! length prefixes, and trailing bytes never reach this module.

use thiserror::Error;

use super::types::{SignaturePayload, SignedTransaction, UnsignedTransaction};
use crate::config::EIP155_V_OFFSET;
use crate::rlp::{Rlp, RlpError};
use crate::types::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from decoding transaction bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The underlying RLP is malformed or non-canonical.
    #[error(transparent)]
    Rlp(#[from] RlpError),

    /// The outer list has the wrong number of fields for any known form.
    #[error("expected 6 (unsigned) or 9 (signed) fields, got {got}")]
    FieldCount { got: usize },

    /// The recipient field is neither empty (creation) nor 20 bytes.
    #[error("recipient must be empty or 20 bytes, got {got}")]
    RecipientLength { got: usize },

    /// The sequence, fee-limit, or v field does not fit in 64 bits.
    #[error("quantity field wider than 64 bits")]
    QuantityOverflow,

    /// `v` is below the EIP-155 offset. Signatures without replay
    /// protection predate this codebase and stay there.
    #[error("v={v} predates replay protection; refusing to decode")]
    PreEip155 { v: u64 },
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// The six body fields, in canonical order. Shared by all three forms.
fn body_fields(tx: &UnsignedTransaction) -> Vec<Rlp> {
    let recipient = match &tx.recipient {
        Some(addr) => Rlp::bytes(addr.as_bytes().to_vec()),
        // Contract creation rides as the empty byte string, not an absent
        // field; the field count never changes.
        None => Rlp::bytes(Vec::new()),
    };
    vec![
        Rlp::uint64(tx.sequence),
        Rlp::uint(tx.fee_rate),
        Rlp::uint64(tx.fee_limit),
        recipient,
        Rlp::uint(tx.value),
        Rlp::bytes(tx.payload.clone()),
    ]
}

/// Canonical encoding of an unsigned transaction (6-field list).
pub fn encode_unsigned(tx: &UnsignedTransaction) -> Vec<u8> {
    Rlp::list(body_fields(tx)).encode()
}

/// The EIP-155 signing pre-image: body plus `[chain_id, "", ""]`.
/// Hash this with Keccak-256 and you have the message the signer commits
/// to.
pub fn signing_preimage(tx: &UnsignedTransaction, chain_id: u64) -> Vec<u8> {
    let mut fields = body_fields(tx);
    fields.push(Rlp::uint64(chain_id));
    fields.push(Rlp::bytes(Vec::new()));
    fields.push(Rlp::bytes(Vec::new()));
    Rlp::list(fields).encode()
}

/// The signed wire form: body plus `[v, r, s]`. These bytes go to the
/// node verbatim, and their Keccak-256 hash is the transaction id.
pub fn encode_signed(stx: &SignedTransaction) -> Vec<u8> {
    let mut fields = body_fields(&stx.transaction);
    fields.push(Rlp::uint64(stx.signature.v()));
    fields.push(Rlp::uint(stx.signature.r));
    fields.push(Rlp::uint(stx.signature.s));
    Rlp::list(fields).encode()
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Result of decoding: the input was either an unsigned body or a full
/// signed transaction, distinguished by field count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedTransaction {
    /// A 6-field unsigned body.
    Unsigned(UnsignedTransaction),
    /// A 9-field signed transaction.
    Signed(SignedTransaction),
}

/// Decode canonical transaction bytes.
///
/// Inverse of [`encode_unsigned`] and [`encode_signed`]: for every valid
/// transaction `x`, `decode(encode(x))` reproduces `x` exactly.
///
/// # Errors
///
/// Any RLP-level malformation propagates as [`DecodeError::Rlp`];
/// structurally valid RLP with the wrong shape fails with the more
/// specific variants.
pub fn decode(bytes: &[u8]) -> Result<DecodedTransaction, DecodeError> {
    let value = Rlp::decode(bytes)?;
    let fields = value.as_list()?;

    match fields.len() {
        6 => Ok(DecodedTransaction::Unsigned(decode_body(fields)?)),
        9 => {
            let transaction = decode_body(&fields[..6])?;
            let signature = decode_signature(&fields[6..])?;
            Ok(DecodedTransaction::Signed(SignedTransaction {
                transaction,
                signature,
            }))
        }
        got => Err(DecodeError::FieldCount { got }),
    }
}

fn decode_body(fields: &[Rlp]) -> Result<UnsignedTransaction, DecodeError> {
    let sequence = fields[0].as_u64().map_err(quantity)?;
    let fee_rate = fields[1].as_uint()?;
    let fee_limit = fields[2].as_u64().map_err(quantity)?;

    let recipient_bytes = fields[3].as_bytes()?;
    let recipient = match recipient_bytes.len() {
        0 => None,
        20 => {
            let mut raw = [0u8; 20];
            raw.copy_from_slice(recipient_bytes);
            Some(Address::from_bytes(raw))
        }
        got => return Err(DecodeError::RecipientLength { got }),
    };

    let value = fields[4].as_uint()?;
    let payload = fields[5].as_bytes()?.to_vec();

    Ok(UnsignedTransaction {
        sequence,
        recipient,
        value,
        fee_limit,
        fee_rate,
        payload,
    })
}

fn decode_signature(fields: &[Rlp]) -> Result<SignaturePayload, DecodeError> {
    let v = fields[0].as_u64().map_err(quantity)?;
    if v < EIP155_V_OFFSET {
        return Err(DecodeError::PreEip155 { v });
    }
    // v = recovery_id + chain_id * 2 + 35, so parity recovers the id and
    // the rest is the chain.
    let recovery_id = ((v - EIP155_V_OFFSET) % 2) as u8;
    let chain_id = (v - EIP155_V_OFFSET - recovery_id as u64) / 2;

    Ok(SignaturePayload {
        r: fields[1].as_uint()?,
        s: fields[2].as_uint()?,
        recovery_id,
        chain_id,
    })
}

/// Width errors on u64 quantities deserve a transaction-level name, not a
/// bare RLP error.
fn quantity(err: RlpError) -> DecodeError {
    match err {
        RlpError::IntegerOverflow { .. } => DecodeError::QuantityOverflow,
        other => DecodeError::Rlp(other),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    /// The transfer every tutorial builds: 1 ether to the same throwaway
    /// recipient, 21000 fee units at 2 gwei, sequence 0.
    fn tutorial_transfer() -> UnsignedTransaction {
        UnsignedTransaction {
            sequence: 0,
            recipient: Some("0x4592d8f8d7b001e72cb26a73e4fa1806a51ac79d".parse().unwrap()),
            value: U256::from(1_000_000_000_000_000_000u64),
            fee_limit: 21_000,
            fee_rate: U256::from(2_000_000_000u64),
            payload: Vec::new(),
        }
    }

    fn signed_tutorial_transfer() -> SignedTransaction {
        SignedTransaction {
            transaction: tutorial_transfer(),
            signature: SignaturePayload {
                r: U256::from_big_endian(
                    &hex::decode(
                        "47e654076dd2c7fead11e7be8357318e7a5e79d11ed23d3e5a9a1fd5f467a8c2",
                    )
                    .unwrap(),
                ),
                s: U256::from_big_endian(
                    &hex::decode(
                        "1cc8123e41c71cbb370fe090fd46ff8d4c1f42912f26006afb581440c686cf1f",
                    )
                    .unwrap(),
                ),
                recovery_id: 1,
                chain_id: 1,
            },
        }
    }

    #[test]
    fn preimage_pinned_vector() {
        // Chain id 1 lands in position 7 with two empty placeholders
        // behind it: ...80 01 80 80.
        assert_eq!(
            hex::encode(signing_preimage(&tutorial_transfer(), 1)),
            "eb808477359400825208944592d8f8d7b001e72cb26a73e4fa1806a51ac79d\
             880de0b6b3a764000080018080"
        );
    }

    #[test]
    fn preimage_differs_per_chain() {
        let tx = tutorial_transfer();
        assert_ne!(signing_preimage(&tx, 1), signing_preimage(&tx, 5));
    }

    #[test]
    fn signed_wire_pinned_vector() {
        assert_eq!(
            hex::encode(encode_signed(&signed_tutorial_transfer())),
            "f86b808477359400825208944592d8f8d7b001e72cb26a73e4fa1806a51ac79d\
             880de0b6b3a76400008026a047e654076dd2c7fead11e7be8357318e7a5e79d1\
             1ed23d3e5a9a1fd5f467a8c2a01cc8123e41c71cbb370fe090fd46ff8d4c1f42\
             912f26006afb581440c686cf1f"
        );
    }

    #[test]
    fn unsigned_roundtrip() {
        let tx = tutorial_transfer();
        let decoded = decode(&encode_unsigned(&tx)).unwrap();
        assert_eq!(decoded, DecodedTransaction::Unsigned(tx));
    }

    #[test]
    fn signed_roundtrip() {
        let stx = signed_tutorial_transfer();
        let decoded = decode(&encode_signed(&stx)).unwrap();
        assert_eq!(decoded, DecodedTransaction::Signed(stx));
    }

    #[test]
    fn creation_roundtrip() {
        let tx = UnsignedTransaction {
            recipient: None,
            payload: vec![0x60, 0x80, 0x60, 0x40, 0x52],
            ..tutorial_transfer()
        };
        let decoded = decode(&encode_unsigned(&tx)).unwrap();
        assert_eq!(decoded, DecodedTransaction::Unsigned(tx));
    }

    #[test]
    fn zero_value_fields_roundtrip() {
        // Zeros exercise the empty-string integer form in every position.
        let tx = UnsignedTransaction {
            sequence: 0,
            recipient: Some("0x4592d8f8d7b001e72cb26a73e4fa1806a51ac79d".parse().unwrap()),
            value: U256::zero(),
            fee_limit: 1,
            fee_rate: U256::zero(),
            payload: Vec::new(),
        };
        let decoded = decode(&encode_unsigned(&tx)).unwrap();
        assert_eq!(decoded, DecodedTransaction::Unsigned(tx));
    }

    #[test]
    fn large_payload_roundtrip() {
        // 300 payload bytes force the long-form length prefix on both the
        // payload and the outer list.
        let tx = UnsignedTransaction {
            payload: vec![0xab; 300],
            ..tutorial_transfer()
        };
        let decoded = decode(&encode_unsigned(&tx)).unwrap();
        assert_eq!(decoded, DecodedTransaction::Unsigned(tx));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let five = Rlp::list(vec![
            Rlp::uint64(0),
            Rlp::uint64(1),
            Rlp::uint64(2),
            Rlp::uint64(3),
            Rlp::uint64(4),
        ])
        .encode();
        assert_eq!(decode(&five), Err(DecodeError::FieldCount { got: 5 }));
    }

    #[test]
    fn rejects_bad_recipient_length() {
        let fields = vec![
            Rlp::uint64(0),
            Rlp::uint64(1),
            Rlp::uint64(21_000),
            Rlp::bytes(vec![0x45; 19]),
            Rlp::uint64(0),
            Rlp::bytes(Vec::new()),
        ];
        let bytes = Rlp::list(fields).encode();
        assert_eq!(
            decode(&bytes),
            Err(DecodeError::RecipientLength { got: 19 })
        );
    }

    #[test]
    fn rejects_truncated_wire_bytes() {
        let mut bytes = encode_signed(&signed_tutorial_transfer());
        bytes.truncate(bytes.len() - 3);
        assert_eq!(decode(&bytes), Err(DecodeError::Rlp(RlpError::Truncated)));
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut bytes = encode_signed(&signed_tutorial_transfer());
        bytes.push(0x00);
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::Rlp(RlpError::TrailingBytes { .. }))
        ));
    }

    #[test]
    fn rejects_non_minimal_sequence() {
        // Sequence 1 written as 0x00 0x01: valid-looking, non-canonical.
        let fields = vec![
            Rlp::Bytes(vec![0x00, 0x01]),
            Rlp::uint64(1),
            Rlp::uint64(21_000),
            Rlp::bytes(vec![0x45; 20]),
            Rlp::uint64(0),
            Rlp::bytes(Vec::new()),
        ];
        let bytes = Rlp::list(fields).encode();
        assert_eq!(
            decode(&bytes),
            Err(DecodeError::Rlp(RlpError::NonMinimalInteger))
        );
    }

    #[test]
    fn rejects_pre_eip155_v() {
        let fields = vec![
            Rlp::uint64(0),
            Rlp::uint64(1),
            Rlp::uint64(21_000),
            Rlp::bytes(vec![0x45; 20]),
            Rlp::uint64(0),
            Rlp::bytes(Vec::new()),
            Rlp::uint64(28), // legacy v
            Rlp::uint64(1),
            Rlp::uint64(1),
        ];
        let bytes = Rlp::list(fields).encode();
        assert_eq!(decode(&bytes), Err(DecodeError::PreEip155 { v: 28 }));
    }

    #[test]
    fn decoded_signature_recovers_chain_and_parity() {
        let stx = signed_tutorial_transfer();
        match decode(&encode_signed(&stx)).unwrap() {
            DecodedTransaction::Signed(back) => {
                assert_eq!(back.signature.chain_id, 1);
                assert_eq!(back.signature.recovery_id, 1);
                assert_eq!(back.signature.v(), 38);
            }
            other => panic!("expected signed form, got {:?}", other),
        }
    }

    #[test]
    fn wire_bytes_and_id_accessors_agree() {
        let stx = signed_tutorial_transfer();
        assert_eq!(stx.to_wire_bytes(), encode_signed(&stx));
        assert_eq!(
            stx.id().to_hex(),
            "0xeae352631178ec4fda7c76e7fa84ca96c61e53fa45c9a89444279fe50ef63589"
        );
    }
}
