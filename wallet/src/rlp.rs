//! # Canonical Byte Encoding (RLP)
//!
//! Recursive Length Prefix is the serialization the chain itself speaks:
//! the same bytes feed the signing hash and the wire, so this codec is
//! load-bearing twice over. A single byte of divergence and a node will
//! either reject the transaction or, far worse, accept something you did
//! not mean to sign.
//!
//! ## The encoding, in full
//!
//! RLP knows exactly two shapes: byte strings and lists of RLP values.
//!
//! - A single byte below `0x80` encodes as itself.
//! - A byte string of 0..=55 bytes gets a `0x80 + len` prefix.
//! - A longer byte string gets `0xb7 + len_of_len`, then the length in
//!   minimal big-endian, then the bytes.
//! - Lists are identical with bases `0xc0` and `0xf7` over the
//!   concatenated encodings of their items.
//!
//! Integers are byte strings: minimal big-endian, zero is the empty
//! string. There is no type tag; the reader must know what it expects.
//!
//! ## Strictness
//!
//! Encoding is easy; the value of this module is in what [`Rlp::decode`]
//! *refuses*. For every value there is exactly one valid encoding, and the
//! decoder enforces that bijection: a single byte wrapped in a prefix, a
//! short length written in long form, length bytes with a leading zero, an
//! integer with a leading zero, truncated input, and trailing garbage are
//! all hard errors. The round-trip law `decode(encode(x)) == x` only
//! deserves the name "law" if no second preimage can sneak through.

use std::fmt;

use primitive_types::U256;
use thiserror::Error;

/// Longest payload that still uses the single-byte length prefix.
/// At 56 bytes the encoding switches to the length-of-length form; the
/// boundary is exercised explicitly in the tests below.
const MAX_SHORT_LEN: usize = 55;

const SHORT_STRING_BASE: u8 = 0x80;
const LONG_STRING_BASE: u8 = 0xb7;
const SHORT_LIST_BASE: u8 = 0xc0;
const LONG_LIST_BASE: u8 = 0xf7;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from decoding or reinterpreting RLP data.
///
/// Every variant is some flavor of "malformed encoding"; the split exists
/// so a failing test tells you *which* rule broke.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RlpError {
    /// The input ends before the encoding it promises is complete.
    #[error("input truncated: encoding is longer than the data")]
    Truncated,

    /// The input decodes, but not via the unique canonical form.
    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    /// A complete value was decoded but bytes remain after it.
    #[error("{count} trailing bytes after a complete encoding")]
    TrailingBytes { count: usize },

    /// An integer field carries a leading zero byte.
    #[error("non-minimal integer: leading zero byte")]
    NonMinimalInteger,

    /// An integer field is wider than the caller's target type.
    #[error("integer wider than {max} bytes")]
    IntegerOverflow { max: usize },

    /// A declared length does not fit in memory on this platform.
    #[error("declared length does not fit in usize")]
    LengthOverflow,

    /// The caller expected a byte string but found a list.
    #[error("expected a byte string, found a list")]
    ExpectedBytes,

    /// The caller expected a list but found a byte string.
    #[error("expected a list, found a byte string")]
    ExpectedList,
}

// ---------------------------------------------------------------------------
// Rlp value
// ---------------------------------------------------------------------------

/// An RLP value: either a byte string or a list of RLP values.
///
/// This is the whole data model. Transactions, receipts, blocks, every
/// structure the chain serializes is some nesting of these two shapes.
#[derive(Clone, PartialEq, Eq)]
pub enum Rlp {
    /// An opaque byte string (possibly empty).
    Bytes(Vec<u8>),
    /// An ordered list of nested values (possibly empty).
    List(Vec<Rlp>),
}

impl Rlp {
    /// Build a byte-string value.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Rlp::Bytes(data.into())
    }

    /// Build a list value.
    pub fn list(items: Vec<Rlp>) -> Self {
        Rlp::List(items)
    }

    /// Encode an unsigned integer as its minimal big-endian byte string.
    /// Zero encodes as the empty string; there are no leading zero bytes,
    /// ever.
    pub fn uint(value: U256) -> Self {
        if value.is_zero() {
            return Rlp::Bytes(Vec::new());
        }
        let mut buf = [0u8; 32];
        value.to_big_endian(&mut buf);
        let width = (value.bits() + 7) / 8;
        Rlp::Bytes(buf[32 - width..].to_vec())
    }

    /// Convenience for `u64` quantities (sequence numbers, fee limits,
    /// chain ids).
    pub fn uint64(value: u64) -> Self {
        Self::uint(U256::from(value))
    }

    // -- interpretation -----------------------------------------------------

    /// View this value as a byte string.
    pub fn as_bytes(&self) -> Result<&[u8], RlpError> {
        match self {
            Rlp::Bytes(b) => Ok(b),
            Rlp::List(_) => Err(RlpError::ExpectedBytes),
        }
    }

    /// View this value as a list of items.
    pub fn as_list(&self) -> Result<&[Rlp], RlpError> {
        match self {
            Rlp::List(items) => Ok(items),
            Rlp::Bytes(_) => Err(RlpError::ExpectedList),
        }
    }

    /// Interpret this value as an unsigned 256-bit integer, enforcing
    /// minimality. An empty string is zero; a leading zero byte is an
    /// error, because accepting it would give the same integer two
    /// encodings and break the round-trip bijection.
    pub fn as_uint(&self) -> Result<U256, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.is_empty() {
            return Ok(U256::zero());
        }
        if bytes[0] == 0 {
            return Err(RlpError::NonMinimalInteger);
        }
        if bytes.len() > 32 {
            return Err(RlpError::IntegerOverflow { max: 32 });
        }
        Ok(U256::from_big_endian(bytes))
    }

    /// Interpret this value as an unsigned 64-bit integer, with the same
    /// minimality rules as [`Rlp::as_uint`].
    pub fn as_u64(&self) -> Result<u64, RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.is_empty() {
            return Ok(0);
        }
        if bytes[0] == 0 {
            return Err(RlpError::NonMinimalInteger);
        }
        if bytes.len() > 8 {
            return Err(RlpError::IntegerOverflow { max: 8 });
        }
        let mut buf = [0u8; 8];
        buf[8 - bytes.len()..].copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    // -- encoding -----------------------------------------------------------

    /// Serialize this value to its canonical byte encoding.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Rlp::Bytes(b) => {
                if b.len() == 1 && b[0] < SHORT_STRING_BASE {
                    out.push(b[0]);
                } else {
                    write_length(out, b.len(), SHORT_STRING_BASE, LONG_STRING_BASE);
                    out.extend_from_slice(b);
                }
            }
            Rlp::List(items) => {
                let payload_len: usize = items.iter().map(Rlp::encoded_len).sum();
                write_length(out, payload_len, SHORT_LIST_BASE, LONG_LIST_BASE);
                for item in items {
                    item.encode_into(out);
                }
            }
        }
    }

    /// Length of the encoding without producing it. Keeps `encode` to a
    /// single allocation.
    fn encoded_len(&self) -> usize {
        match self {
            Rlp::Bytes(b) => {
                if b.len() == 1 && b[0] < SHORT_STRING_BASE {
                    1
                } else {
                    prefix_len(b.len()) + b.len()
                }
            }
            Rlp::List(items) => {
                let payload: usize = items.iter().map(Rlp::encoded_len).sum();
                prefix_len(payload) + payload
            }
        }
    }

    // -- decoding -----------------------------------------------------------

    /// Decode a single value from `input`, consuming it entirely.
    ///
    /// # Errors
    ///
    /// [`RlpError::Truncated`] on short input, [`RlpError::TrailingBytes`]
    /// if anything follows the value, and [`RlpError::NonCanonical`] for
    /// any of the second-preimage forms documented at module level.
    pub fn decode(input: &[u8]) -> Result<Rlp, RlpError> {
        let (value, consumed) = decode_item(input)?;
        if consumed != input.len() {
            return Err(RlpError::TrailingBytes {
                count: input.len() - consumed,
            });
        }
        Ok(value)
    }
}

impl fmt::Debug for Rlp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rlp::Bytes(b) => write!(f, "Bytes(0x{})", hex::encode(b)),
            Rlp::List(items) => f.debug_list().entries(items).finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Length prefixes
// ---------------------------------------------------------------------------

fn prefix_len(payload_len: usize) -> usize {
    if payload_len <= MAX_SHORT_LEN {
        1
    } else {
        1 + be_len(payload_len)
    }
}

/// Number of bytes in the minimal big-endian form of `value` (>= 1).
fn be_len(value: usize) -> usize {
    (usize::BITS as usize - value.leading_zeros() as usize + 7) / 8
}

fn write_length(out: &mut Vec<u8>, payload_len: usize, short_base: u8, long_base: u8) {
    if payload_len <= MAX_SHORT_LEN {
        out.push(short_base + payload_len as u8);
    } else {
        let width = be_len(payload_len);
        out.push(long_base + width as u8);
        out.extend_from_slice(&payload_len.to_be_bytes()[std::mem::size_of::<usize>() - width..]);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decode one item from the front of `input`, returning it and the number
/// of bytes consumed.
fn decode_item(input: &[u8]) -> Result<(Rlp, usize), RlpError> {
    let &tag = input.first().ok_or(RlpError::Truncated)?;

    match tag {
        // A lone byte below 0x80 is its own encoding.
        0x00..=0x7f => Ok((Rlp::Bytes(vec![tag]), 1)),

        // Short string: length in the tag itself.
        0x80..=0xb7 => {
            let len = (tag - SHORT_STRING_BASE) as usize;
            let payload = read_payload(input, 1, len)?;
            if len == 1 && payload[0] < SHORT_STRING_BASE {
                return Err(RlpError::NonCanonical(
                    "single byte below 0x80 must encode as itself",
                ));
            }
            Ok((Rlp::Bytes(payload.to_vec()), 1 + len))
        }

        // Long string: tag carries the width of the length field.
        0xb8..=0xbf => {
            let (len, header) = read_long_length(input, LONG_STRING_BASE)?;
            let payload = read_payload(input, header, len)?;
            Ok((Rlp::Bytes(payload.to_vec()), header + len))
        }

        // Short list.
        0xc0..=0xf7 => {
            let len = (tag - SHORT_LIST_BASE) as usize;
            let payload = read_payload(input, 1, len)?;
            Ok((Rlp::List(decode_list_payload(payload)?), 1 + len))
        }

        // Long list.
        0xf8..=0xff => {
            let (len, header) = read_long_length(input, LONG_LIST_BASE)?;
            let payload = read_payload(input, header, len)?;
            Ok((Rlp::List(decode_list_payload(payload)?), header + len))
        }
    }
}

/// Read and validate a long-form length. Returns the payload length and
/// the total header size (tag + length bytes).
fn read_long_length(input: &[u8], base: u8) -> Result<(usize, usize), RlpError> {
    let width = (input[0] - base) as usize;
    let len_bytes = input.get(1..1 + width).ok_or(RlpError::Truncated)?;
    if len_bytes[0] == 0 {
        return Err(RlpError::NonCanonical("length bytes have a leading zero"));
    }
    if width > std::mem::size_of::<usize>() {
        return Err(RlpError::LengthOverflow);
    }
    let mut len: usize = 0;
    for &b in len_bytes {
        len = len.checked_mul(256).ok_or(RlpError::LengthOverflow)? + b as usize;
    }
    if len <= MAX_SHORT_LEN {
        return Err(RlpError::NonCanonical(
            "length below 56 must use the short form",
        ));
    }
    Ok((len, 1 + width))
}

fn read_payload(input: &[u8], offset: usize, len: usize) -> Result<&[u8], RlpError> {
    let end = offset.checked_add(len).ok_or(RlpError::LengthOverflow)?;
    input.get(offset..end).ok_or(RlpError::Truncated)
}

/// Decode consecutive items until the list payload is exactly consumed.
fn decode_list_payload(mut payload: &[u8]) -> Result<Vec<Rlp>, RlpError> {
    let mut items = Vec::new();
    while !payload.is_empty() {
        let (item, consumed) = decode_item(payload)?;
        items.push(item);
        payload = &payload[consumed..];
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: &Rlp) -> Rlp {
        Rlp::decode(&value.encode()).expect("canonical output must decode")
    }

    // -- canonical reference vectors ----------------------------------------

    #[test]
    fn encodes_dog() {
        // The reference example everyone starts with.
        assert_eq!(Rlp::bytes(&b"dog"[..]).encode(), b"\x83dog");
    }

    #[test]
    fn encodes_cat_dog_list() {
        let list = Rlp::list(vec![Rlp::bytes(&b"cat"[..]), Rlp::bytes(&b"dog"[..])]);
        assert_eq!(list.encode(), b"\xc8\x83cat\x83dog");
    }

    #[test]
    fn encodes_empty_string_and_list() {
        assert_eq!(Rlp::bytes(Vec::new()).encode(), [0x80]);
        assert_eq!(Rlp::list(vec![]).encode(), [0xc0]);
    }

    #[test]
    fn encodes_single_low_byte_as_itself() {
        assert_eq!(Rlp::bytes(vec![0x0f]).encode(), [0x0f]);
        assert_eq!(Rlp::bytes(vec![0x00]).encode(), [0x00]);
        assert_eq!(Rlp::bytes(vec![0x7f]).encode(), [0x7f]);
        // 0x80 is the first byte that needs a prefix.
        assert_eq!(Rlp::bytes(vec![0x80]).encode(), [0x81, 0x80]);
    }

    #[test]
    fn encodes_integers_minimally() {
        assert_eq!(Rlp::uint64(0).encode(), [0x80]);
        assert_eq!(Rlp::uint64(15).encode(), [0x0f]);
        assert_eq!(Rlp::uint64(1024).encode(), [0x82, 0x04, 0x00]);
        assert_eq!(
            Rlp::uint(U256::from(1_000_000_000_000_000_000u64)).encode(),
            hex::decode("880de0b6b3a7640000").unwrap()
        );
    }

    // -- the 55/56 boundary -------------------------------------------------

    #[test]
    fn prefix_form_changes_at_56_bytes() {
        // 0 bytes: empty-string marker.
        assert_eq!(Rlp::bytes(vec![0x61; 0]).encode()[..1], [0x80]);
        // 1 byte below 0x80: no prefix at all.
        assert_eq!(Rlp::bytes(vec![0x61; 1]).encode(), [0x61]);
        // 55 bytes: the last length that fits in the tag.
        let e55 = Rlp::bytes(vec![0x61; 55]).encode();
        assert_eq!(e55[0], 0xb7);
        assert_eq!(e55.len(), 56);
        // 56 bytes: one past the boundary, length moves out of the tag.
        let e56 = Rlp::bytes(vec![0x61; 56]).encode();
        assert_eq!(&e56[..2], &[0xb8, 56]);
        assert_eq!(e56.len(), 58);
        // 300 bytes: two length bytes.
        let e300 = Rlp::bytes(vec![0x61; 300]).encode();
        assert_eq!(&e300[..3], &[0xb9, 0x01, 0x2c]);
        assert_eq!(e300.len(), 303);
    }

    #[test]
    fn boundary_lengths_roundtrip() {
        for len in [0usize, 1, 55, 56, 300] {
            let value = Rlp::bytes(vec![0x61; len]);
            assert_eq!(roundtrip(&value), value, "length {}", len);
        }
    }

    #[test]
    fn list_prefix_form_changes_at_56_byte_payload() {
        // 11 five-byte items: 55-byte payload, short form.
        let short = Rlp::list(vec![Rlp::bytes(vec![0x61; 4]); 11]);
        assert_eq!(short.encode()[0], 0xf7);
        // One more item pushes the payload long.
        let long = Rlp::list(vec![Rlp::bytes(vec![0x61; 4]); 12]);
        assert_eq!(&long.encode()[..2], &[0xf8, 60]);
        assert_eq!(roundtrip(&long), long);
    }

    // -- strict decoding ----------------------------------------------------

    #[test]
    fn rejects_wrapped_single_byte() {
        // 0x05 written as 0x81 0x05: decodes to the same bytes under a lax
        // reader, which is exactly why we refuse it.
        assert_eq!(
            Rlp::decode(&[0x81, 0x05]),
            Err(RlpError::NonCanonical(
                "single byte below 0x80 must encode as itself"
            ))
        );
    }

    #[test]
    fn rejects_long_form_for_short_length() {
        // 5 bytes announced via the long form.
        let mut input = vec![0xb8, 0x05];
        input.extend_from_slice(&[0x61; 5]);
        assert_eq!(
            Rlp::decode(&input),
            Err(RlpError::NonCanonical(
                "length below 56 must use the short form"
            ))
        );
    }

    #[test]
    fn rejects_length_with_leading_zero() {
        let mut input = vec![0xb9, 0x00, 0x38];
        input.extend_from_slice(&[0x61; 56]);
        assert_eq!(
            Rlp::decode(&input),
            Err(RlpError::NonCanonical("length bytes have a leading zero"))
        );
    }

    #[test]
    fn rejects_truncated_input() {
        assert_eq!(Rlp::decode(&[]), Err(RlpError::Truncated));
        assert_eq!(Rlp::decode(&[0x83, 0x61]), Err(RlpError::Truncated));
        assert_eq!(Rlp::decode(&[0xb8, 0x38]), Err(RlpError::Truncated));
        assert_eq!(Rlp::decode(&[0xc2, 0x61]), Err(RlpError::Truncated));
    }

    #[test]
    fn rejects_trailing_bytes() {
        assert_eq!(
            Rlp::decode(&[0x83, 0x64, 0x6f, 0x67, 0xff]),
            Err(RlpError::TrailingBytes { count: 1 })
        );
    }

    #[test]
    fn rejects_truncated_item_inside_list() {
        // List payload claims 2 bytes, inner string claims 2 more.
        assert_eq!(Rlp::decode(&[0xc2, 0x83, 0x61]), Err(RlpError::Truncated));
    }

    // -- integer interpretation ---------------------------------------------

    #[test]
    fn uint_roundtrip() {
        for v in [0u64, 1, 127, 128, 255, 256, 21_000, u64::MAX] {
            let value = Rlp::uint64(v);
            assert_eq!(roundtrip(&value).as_u64().unwrap(), v);
        }
    }

    #[test]
    fn uint_rejects_leading_zero() {
        assert_eq!(
            Rlp::Bytes(vec![0x00, 0x01]).as_uint(),
            Err(RlpError::NonMinimalInteger)
        );
    }

    #[test]
    fn uint_zero_is_empty_string() {
        assert_eq!(Rlp::uint64(0), Rlp::Bytes(Vec::new()));
        assert_eq!(Rlp::Bytes(Vec::new()).as_uint().unwrap(), U256::zero());
    }

    #[test]
    fn uint_rejects_overflow() {
        assert_eq!(
            Rlp::Bytes(vec![0x01; 33]).as_uint(),
            Err(RlpError::IntegerOverflow { max: 32 })
        );
        assert_eq!(
            Rlp::Bytes(vec![0x01; 9]).as_u64(),
            Err(RlpError::IntegerOverflow { max: 8 })
        );
    }

    #[test]
    fn type_mismatches() {
        assert_eq!(Rlp::list(vec![]).as_bytes(), Err(RlpError::ExpectedBytes));
        assert_eq!(
            Rlp::bytes(Vec::new()).as_list(),
            Err(RlpError::ExpectedList)
        );
        assert_eq!(Rlp::list(vec![]).as_uint(), Err(RlpError::ExpectedBytes));
    }

    // -- structure ----------------------------------------------------------

    #[test]
    fn nested_lists_roundtrip() {
        // The set-theoretic representation of three, because the original
        // RLP spec authors had a sense of humor.
        let three = Rlp::list(vec![
            Rlp::list(vec![]),
            Rlp::list(vec![Rlp::list(vec![])]),
            Rlp::list(vec![Rlp::list(vec![]), Rlp::list(vec![Rlp::list(vec![])])]),
        ]);
        assert_eq!(three.encode(), hex::decode("c7c0c1c0c3c0c1c0").unwrap());
        assert_eq!(roundtrip(&three), three);
    }

    #[test]
    fn transaction_shaped_list_roundtrips() {
        let tx = Rlp::list(vec![
            Rlp::uint64(0),
            Rlp::uint64(2_000_000_000),
            Rlp::uint64(21_000),
            Rlp::bytes(vec![0x45; 20]),
            Rlp::uint(U256::from(1_000_000_000_000_000_000u64)),
            Rlp::bytes(Vec::new()),
        ]);
        assert_eq!(roundtrip(&tx), tx);
    }
}
