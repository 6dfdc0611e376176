//! EIP-155 transaction signing.
//!
//! Signing is a separate step from building because the keypair may not be
//! anywhere near the machine that assembled the transaction (hardware
//! wallet, air-gapped signer, CI fixture). The pipeline is short and every
//! stage of it is deterministic:
//!
//! 1. Encode the transaction with the chain id and two empty placeholder
//!    fields appended ([`super::encoding::signing_preimage`]).
//! 2. Keccak-256 the pre-image.
//! 3. Sign the digest with RFC 6979 deterministic recoverable ECDSA.
//!
//! Step 3 is where a lot of historical grief lives. Random-nonce ECDSA
//! leaks the private key if the RNG ever misbehaves at signing time (see:
//! PlayStation 3, 2010). RFC 6979 derives the nonce from the key and the
//! message instead, which removes the RNG from the threat model *and*
//! makes `sign` a pure function: same transaction, same key, same chain,
//! same signature, every time. The golden-vector tests below depend on
//! exactly that.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use primitive_types::U256;
use thiserror::Error;

use super::encoding::signing_preimage;
use super::types::{SignaturePayload, SignedTransaction, UnsignedTransaction};
use crate::crypto::hash::keccak256;
use crate::crypto::keys::Keypair;
use crate::types::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from signing or signature recovery.
///
/// `sign` cannot actually hit these for a well-formed [`Keypair`] and a
/// 32-byte digest; the variants exist because the underlying ECDSA API is
/// fallible and swallowing its errors with a panic would violate the
/// crate's no-panic policy. Recovery, on the other hand, processes
/// attacker-controllable bytes and fails for real.
#[derive(Debug, Error)]
pub enum SignError {
    /// The ECDSA backend rejected the operation.
    #[error("ecdsa failure: {0}")]
    Ecdsa(#[from] k256::ecdsa::Error),

    /// The stored recovery id is not 0 or 1.
    #[error("recovery id {0} is out of range")]
    InvalidRecoveryId(u8),
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Sign a transaction for the given chain.
///
/// Produces a [`SignedTransaction`] whose signature is bound to
/// `chain_id`: the pre-image hashes the chain id into the exact slots the
/// signature occupies on the wire, so replaying the result on a different
/// network changes the message and invalidates the signature.
///
/// Deterministic by construction (RFC 6979). The returned `s` is always
/// the low-s form; networks reject the high form to kill signature
/// malleability, and `k256` normalizes before we ever see it.
pub fn sign(
    tx: &UnsignedTransaction,
    keypair: &Keypair,
    chain_id: u64,
) -> Result<SignedTransaction, SignError> {
    let digest = keccak256(&signing_preimage(tx, chain_id));
    let (signature, recovery_id) = keypair.signing_key().sign_prehash_recoverable(&digest)?;

    let (r_bytes, s_bytes) = signature.split_bytes();
    let payload = SignaturePayload {
        r: U256::from_big_endian(r_bytes.as_slice()),
        s: U256::from_big_endian(s_bytes.as_slice()),
        recovery_id: recovery_id.to_byte(),
        chain_id,
    };

    Ok(SignedTransaction {
        transaction: tx.clone(),
        signature: payload,
    })
}

/// Recover the signer's address from a signed transaction.
///
/// Reconstructs the public key from `(r, s, recovery_id)` over the
/// pre-image digest, then derives the address from it. A transaction that
/// decodes cleanly but recovers to an unexpected address was signed by
/// someone else, tampered with, or bound to a different chain; all three
/// look identical from here, which is the point of the construction.
pub fn recover_signer(stx: &SignedTransaction) -> Result<Address, SignError> {
    let digest = keccak256(&signing_preimage(&stx.transaction, stx.signature.chain_id));

    let mut r_bytes = [0u8; 32];
    stx.signature.r.to_big_endian(&mut r_bytes);
    let mut s_bytes = [0u8; 32];
    stx.signature.s.to_big_endian(&mut s_bytes);

    let signature = EcdsaSignature::from_scalars(r_bytes, s_bytes)?;
    let recovery_id = RecoveryId::from_byte(stx.signature.recovery_id)
        .filter(|id| id.to_byte() <= 1)
        .ok_or(SignError::InvalidRecoveryId(stx.signature.recovery_id))?;

    let verifying_key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)?;
    let point = verifying_key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Ok(Address::from_bytes(out))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::builder::TransactionBuilder;
    use crate::transaction::encoding::{decode, encode_signed, DecodedTransaction};

    const TUTORIAL_KEY: &str = "fad9c8855b740a0b7ed4c221dbad0f33a83a49cad6b3fe8d5817ac83d38b6a19";

    /// secp256k1 group order, for the low-s assertion.
    const CURVE_ORDER: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    fn keypair() -> Keypair {
        Keypair::from_hex(TUTORIAL_KEY).unwrap()
    }

    fn tutorial_transfer() -> UnsignedTransaction {
        TransactionBuilder::new()
            .recipient("0x4592d8f8d7b001e72cb26a73e4fa1806a51ac79d".parse().unwrap())
            .value(U256::from(1_000_000_000_000_000_000u64))
            .fee_limit(21_000)
            .fee_rate(U256::from(2_000_000_000u64))
            .sequence(0)
            .build()
            .unwrap()
    }

    /// Full-width hex of a 256-bit scalar, for byte-exact comparisons.
    fn hex256(value: U256) -> String {
        let mut buf = [0u8; 32];
        value.to_big_endian(&mut buf);
        hex::encode(buf)
    }

    #[test]
    fn signing_is_deterministic() {
        let stx1 = sign(&tutorial_transfer(), &keypair(), 1).unwrap();
        let stx2 = sign(&tutorial_transfer(), &keypair(), 1).unwrap();
        assert_eq!(stx1, stx2, "RFC 6979 means identical bytes every time");
    }

    #[test]
    fn signing_does_not_alter_the_body() {
        let tx = tutorial_transfer();
        let stx = sign(&tx, &keypair(), 1).unwrap();
        assert_eq!(stx.transaction, tx);
    }

    #[test]
    fn golden_signature_chain_1() {
        let stx = sign(&tutorial_transfer(), &keypair(), 1).unwrap();
        assert_eq!(
            hex256(stx.signature.r),
            "47e654076dd2c7fead11e7be8357318e7a5e79d11ed23d3e5a9a1fd5f467a8c2"
        );
        assert_eq!(
            hex256(stx.signature.s),
            "1cc8123e41c71cbb370fe090fd46ff8d4c1f42912f26006afb581440c686cf1f"
        );
        assert_eq!(stx.signature.recovery_id, 1);
        assert_eq!(stx.signature.v(), 38);
    }

    #[test]
    fn golden_signature_chain_5() {
        let stx = sign(&tutorial_transfer(), &keypair(), 5).unwrap();
        assert_eq!(
            hex256(stx.signature.r),
            "61cf6bccc093d30f53fd41a65e6ae9e6710503d3fb150108b60710e081a8e3de"
        );
        assert_eq!(stx.signature.recovery_id, 0);
        assert_eq!(stx.signature.v(), 45);
    }

    #[test]
    fn replay_protection_shifts_v_by_twice_chain_delta() {
        // v = recovery_id + chain_id * 2 + 35. The recovery id is parity
        // noise (each chain's pre-image lands where it lands), so strip it
        // before comparing: what remains must differ by exactly twice the
        // chain-id delta.
        let stx1 = sign(&tutorial_transfer(), &keypair(), 1).unwrap();
        let stx5 = sign(&tutorial_transfer(), &keypair(), 5).unwrap();
        let base1 = stx1.signature.v() - stx1.signature.recovery_id as u64;
        let base5 = stx5.signature.v() - stx5.signature.recovery_id as u64;
        assert_eq!(base5 - base1, 2 * (5 - 1));
    }

    #[test]
    fn different_chains_produce_different_signatures() {
        let stx1 = sign(&tutorial_transfer(), &keypair(), 1).unwrap();
        let stx5 = sign(&tutorial_transfer(), &keypair(), 5).unwrap();
        assert_ne!(stx1.signature.r, stx5.signature.r);
    }

    #[test]
    fn s_is_always_low_form() {
        let half_order = U256::from_big_endian(&hex::decode(CURVE_ORDER).unwrap()) / U256::from(2);
        for chain_id in [1u64, 5, 1337, 11_155_111] {
            let stx = sign(&tutorial_transfer(), &keypair(), chain_id).unwrap();
            assert!(stx.signature.s <= half_order, "chain {}", chain_id);
        }
    }

    #[test]
    fn recover_returns_signer_address() {
        let stx = sign(&tutorial_transfer(), &keypair(), 1).unwrap();
        assert_eq!(recover_signer(&stx).unwrap(), keypair().address());
    }

    #[test]
    fn recovery_detects_tampered_value() {
        let mut stx = sign(&tutorial_transfer(), &keypair(), 1).unwrap();
        stx.transaction.value = U256::from(2_000_000_000_000_000_000u64);
        // Either recovery fails outright or it yields a stranger's
        // address; both mean the tamper was caught.
        match recover_signer(&stx) {
            Ok(addr) => assert_ne!(addr, keypair().address()),
            Err(_) => {}
        }
    }

    #[test]
    fn recovery_rejects_out_of_range_recovery_id() {
        let mut stx = sign(&tutorial_transfer(), &keypair(), 1).unwrap();
        stx.signature.recovery_id = 3;
        assert!(matches!(
            recover_signer(&stx),
            Err(SignError::InvalidRecoveryId(3))
        ));
    }

    #[test]
    fn eip155_conformance_vector() {
        // The worked example from the EIP-155 specification itself:
        // key 0x4646...46, sequence 9, 20 gwei, 21000 fee units, 1 ether
        // to 0x3535...35 on chain 1. The expected bytes are published in
        // the EIP; reproducing them proves pre-image, hash, nonce
        // derivation, and v handling all at once.
        let key = Keypair::from_hex(
            "4646464646464646464646464646464646464646464646464646464646464646",
        )
        .unwrap();
        let tx = TransactionBuilder::new()
            .sequence(9)
            .recipient("0x3535353535353535353535353535353535353535".parse().unwrap())
            .value(U256::from(1_000_000_000_000_000_000u64))
            .fee_limit(21_000)
            .fee_rate(U256::from(20_000_000_000u64))
            .build()
            .unwrap();

        let digest = keccak256(&signing_preimage(&tx, 1));
        assert_eq!(
            hex::encode(digest),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );

        let stx = sign(&tx, &key, 1).unwrap();
        assert_eq!(
            hex::encode(encode_signed(&stx)),
            "f86c098504a817c800825208943535353535353535353535353535353535353535\
             880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c\
             71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc\
             64214b297fb1966a3b6d83"
        );
    }

    #[test]
    fn signed_wire_bytes_roundtrip_through_decode() {
        let stx = sign(&tutorial_transfer(), &keypair(), 1).unwrap();
        let decoded = decode(&stx.to_wire_bytes()).unwrap();
        assert_eq!(decoded, DecodedTransaction::Signed(stx));
    }

    #[test]
    fn contract_call_signs_and_recovers() {
        let call = crate::abi::CallData::erc20_transfer(
            "0x4592d8f8d7b001e72cb26a73e4fa1806a51ac79d".parse().unwrap(),
            U256::from(1_000_000_000_000_000_000u64),
        );
        let tx = TransactionBuilder::new()
            .sequence(1)
            .recipient("0x28b149020d2152179873ec60bed6bf7cd705775d".parse().unwrap())
            .fee_limit(60_000)
            .fee_rate(U256::from(2_000_000_000u64))
            .payload(call.to_bytes())
            .build()
            .unwrap();

        let stx = sign(&tx, &keypair(), 1).unwrap();
        assert_eq!(recover_signer(&stx).unwrap(), keypair().address());
        assert_eq!(
            stx.id().to_hex(),
            "0x6a30e5d1a2ec3df74c93aaccd340ea9bb962401914e9e4c8ac031d1f04287ecb"
        );
    }
}
