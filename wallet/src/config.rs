//! # Chain Constants & Units
//!
//! Every magic number in Flint lives here. If you're hardcoding a chain id
//! or a gas figure somewhere else, you're doing it wrong and you owe the
//! team coffee.
//!
//! Most of these values are fixed by the networks we talk to, not by us.
//! Changing them doesn't break Flint, it breaks your transactions, which
//! is worse: the node will happily reject everything you send and charge
//! you nothing but time.

// ---------------------------------------------------------------------------
// Chain Identifiers
// ---------------------------------------------------------------------------

/// Ethereum mainnet. Mistakes here cost real money.
pub const CHAIN_ID_MAINNET: u64 = 1;

/// Sepolia testnet, the recommended place to break things on purpose.
pub const CHAIN_ID_SEPOLIA: u64 = 11_155_111;

/// Holesky testnet, for when you need a second opinion.
pub const CHAIN_ID_HOLESKY: u64 = 17_000;

/// Local development chain. Geth `--dev`, Anvil, and Hardhat all default
/// to this neighborhood. Reset at will, no promises, no survivors.
pub const CHAIN_ID_DEV: u64 = 1_337;

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Wei per gwei. Fee rates are quoted in gwei by every human and priced
/// in wei by every node; this is the bridge.
pub const WEI_PER_GWEI: u64 = 1_000_000_000;

/// Wei per ether, as a u128 because it does not fit in 64 bits.
/// 10^18. All protocol arithmetic stays in wei; ether exists only for
/// display purposes.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Fee Parameters
// ---------------------------------------------------------------------------

/// Exact fee units consumed by a plain value transfer. This is protocol
/// law, not an estimate: 21000, no more, no less.
pub const PLAIN_TRANSFER_FEE_LIMIT: u64 = 21_000;

/// A sane fee budget for a single ERC-20 style contract call. Unlike
/// plain transfers this IS an estimate; callers who care should ask the
/// node instead of trusting a constant.
pub const TOKEN_TRANSFER_FEE_LIMIT: u64 = 60_000;

/// Fallback fee rate (2 gwei in wei) for dev chains where asking the node
/// is either impossible or pointless.
pub const DEV_FEE_RATE_WEI: u64 = 2_000_000_000;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// secp256k1 secret scalars are 32 bytes. If yours isn't, it isn't a key.
pub const SECRET_KEY_LENGTH: usize = 32;

/// An account address is the last 20 bytes of the Keccak-256 hash of the
/// uncompressed public key (minus its SEC1 tag byte).
pub const ADDRESS_LENGTH: usize = 20;

/// Keccak-256 digests, transaction ids, and signature halves are all
/// 32 bytes wide.
pub const HASH_LENGTH: usize = 32;

/// Contract function selectors are the first 4 bytes of the Keccak-256
/// hash of the canonical signature string.
pub const SELECTOR_LENGTH: usize = 4;

/// Every ABI argument occupies exactly one 32-byte word.
pub const ABI_WORD_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Replay Protection (EIP-155)
// ---------------------------------------------------------------------------

/// Offset folded into the signature's `v` field:
/// `v = recovery_id + chain_id * 2 + 35`. The 35 is historical baggage
/// (27 + 8) that we are all stuck with forever.
pub const EIP155_V_OFFSET: u64 = 35;

/// Pre-EIP-155 `v` base. Only relevant when *reading* ancient signatures;
/// Flint never produces them.
pub const LEGACY_V_OFFSET: u64 = 27;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Converts a gwei amount to wei. Saturating would hide bugs; this is a
/// plain multiply and will panic on overflow in debug builds, which is
/// exactly what you want while developing.
pub fn gwei(amount: u64) -> u64 {
    amount * WEI_PER_GWEI
}

/// Returns a friendly name for a chain id, mainly for logging.
/// Unknown chains get the raw number back because we don't guess.
pub fn chain_name(chain_id: u64) -> String {
    match chain_id {
        CHAIN_ID_MAINNET => "mainnet".to_string(),
        CHAIN_ID_SEPOLIA => "sepolia".to_string(),
        CHAIN_ID_HOLESKY => "holesky".to_string(),
        CHAIN_ID_DEV => "dev".to_string(),
        other => format!("chain-{}", other),
    }
}
