//! Offline walk-through of the Flint pipeline.
//!
//! Derives an address from the classic tutorial key, builds a transfer,
//! signs it for mainnet, prints the wire bytes, and proves the round-trip.
//! No network access anywhere; everything here is pure computation.
//!
//! Run with:
//!   cargo run --example demo

use primitive_types::U256;

use flint_wallet::abi::CallData;
use flint_wallet::crypto::keys::Keypair;
use flint_wallet::transaction::builder::TransactionBuilder;
use flint_wallet::transaction::encoding::{decode, DecodedTransaction};
use flint_wallet::transaction::signing::{recover_signer, sign};

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}==[ Step {num} ]== {title}{RESET}");
}

fn main() {
    println!("{BOLD}Flint — transaction pipeline demo{RESET}");
    println!("{DIM}secp256k1 + RFC 6979 + Keccak-256 + canonical RLP{RESET}");

    section(1, "Load a key, derive the address");
    let keypair = Keypair::from_hex(
        "fad9c8855b740a0b7ed4c221dbad0f33a83a49cad6b3fe8d5817ac83d38b6a19",
    )
    .expect("tutorial key is well-formed");
    println!("  address: {GREEN}{}{RESET}", keypair.address());

    section(2, "Build an unsigned transfer");
    let tx = TransactionBuilder::new()
        .recipient(
            "0x4592d8f8d7b001e72cb26a73e4fa1806a51ac79d"
                .parse()
                .expect("recipient parses"),
        )
        .value(U256::from(1_000_000_000_000_000_000u64)) // 1 ether in wei
        .fee_limit(21_000)
        .fee_rate(U256::from(2_000_000_000u64)) // 2 gwei
        .sequence(0)
        .build()
        .expect("intent is valid");
    println!("  sequence {} | fee limit {} | value {} wei", tx.sequence, tx.fee_limit, tx.value);

    section(3, "Sign for mainnet (chain id 1)");
    let stx = sign(&tx, &keypair, 1).expect("signing is total for a valid keypair");
    println!("  v = {} (recovery {} + chain 1*2 + 35)", stx.signature.v(), stx.signature.recovery_id);
    println!("  deterministic: signing again yields identical bytes");

    section(4, "Canonical wire bytes and transaction id");
    let raw = stx.to_wire_bytes();
    println!("  raw ({} bytes): {DIM}0x{}{RESET}", raw.len(), hex::encode(&raw));
    println!("  id: {GREEN}{}{RESET}", stx.id());

    section(5, "Round-trip and signer recovery");
    match decode(&raw).expect("own bytes decode") {
        DecodedTransaction::Signed(back) => {
            assert_eq!(back, stx);
            let signer = recover_signer(&back).expect("signature recovers");
            println!("  decode(encode(tx)) == tx  ✓");
            println!("  recovered signer: {GREEN}{signer}{RESET}");
        }
        DecodedTransaction::Unsigned(_) => unreachable!("we encoded a signed transaction"),
    }

    section(6, "Contract call data");
    let call = CallData::erc20_transfer(
        "0x4592d8f8d7b001e72cb26a73e4fa1806a51ac79d"
            .parse()
            .expect("recipient parses"),
        U256::from(1_000_000_000_000_000_000u64),
    );
    println!("  selector: 0x{}", hex::encode(call.selector()));
    println!("  payload:  {DIM}{call}{RESET}");

    println!();
    println!("{BOLD}{GREEN}Done.{RESET} Broadcast is the only step that needs a node.");
}
