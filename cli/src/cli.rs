//! # CLI Interface
//!
//! Defines the command-line argument structure for `flint` using `clap`
//! derive. Offline commands (`generate`, `address`, `sign`) never touch
//! the network; the rest talk to a node over JSON-RPC.

use clap::{Parser, Subcommand};

/// Flint command-line wallet.
///
/// Builds, signs, and broadcasts Ethereum-compatible transactions.
/// Signing always happens locally; the only thing that ever leaves this
/// machine is a fully signed byte string.
#[derive(Parser, Debug)]
#[command(name = "flint", about = "Flint command-line wallet", version, propagate_version = true)]
pub struct FlintCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the `flint` binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh keypair and print the address.
    Generate,
    /// Derive the address for a secret key.
    Address(KeyArgs),
    /// Build and sign a transfer offline; print the raw wire hex.
    Sign(SignArgs),
    /// Broadcast previously signed raw transaction hex.
    Send(SendArgs),
    /// Resolve, build, sign, and broadcast a transfer in one step.
    Transfer(TransferArgs),
    /// Look up the receipt for a transaction id.
    Receipt(ReceiptArgs),
}

/// Arguments carrying only a secret key.
#[derive(Parser, Debug)]
pub struct KeyArgs {
    /// Hex-encoded secp256k1 secret key.
    ///
    /// **Never pass this flag on a shared machine's command line.** Use
    /// the environment variable so the key stays out of shell history.
    #[arg(long, env = "FLINT_PRIVATE_KEY", hide_env_values = true)]
    pub key: String,
}

/// Arguments for offline signing.
#[derive(Parser, Debug)]
pub struct SignArgs {
    /// Hex-encoded secp256k1 secret key.
    #[arg(long, env = "FLINT_PRIVATE_KEY", hide_env_values = true)]
    pub key: String,

    /// Recipient address (`0x`-hex, checksummed or lowercase).
    #[arg(long)]
    pub to: String,

    /// Amount in wei, decimal.
    #[arg(long, default_value = "0")]
    pub value_wei: String,

    /// Fee budget in fee units.
    #[arg(long, default_value_t = 21_000)]
    pub fee_limit: u64,

    /// Fee rate in wei, decimal.
    #[arg(long, default_value = "2000000000")]
    pub fee_rate_wei: String,

    /// Sequence number. Offline signing cannot ask the node, so the
    /// caller must know it.
    #[arg(long)]
    pub sequence: u64,

    /// Chain id the signature is bound to.
    #[arg(long, env = "FLINT_CHAIN_ID", default_value_t = 1)]
    pub chain_id: u64,

    /// Optional call data or init code, `0x`-hex.
    #[arg(long)]
    pub payload: Option<String>,
}

/// Arguments for broadcasting raw bytes.
#[derive(Parser, Debug)]
pub struct SendArgs {
    /// JSON-RPC endpoint of a node.
    #[arg(long, env = "FLINT_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Signed raw transaction, `0x`-hex.
    #[arg(long)]
    pub raw: String,
}

/// Arguments for the full transfer pipeline.
#[derive(Parser, Debug)]
pub struct TransferArgs {
    /// JSON-RPC endpoint of a node.
    #[arg(long, env = "FLINT_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Hex-encoded secp256k1 secret key.
    #[arg(long, env = "FLINT_PRIVATE_KEY", hide_env_values = true)]
    pub key: String,

    /// Recipient address.
    #[arg(long)]
    pub to: String,

    /// Amount in wei, decimal.
    #[arg(long)]
    pub value_wei: String,

    /// Fee budget in fee units.
    #[arg(long, default_value_t = 21_000)]
    pub fee_limit: u64,

    /// Fee rate override in wei. Omit to use the node's suggestion.
    #[arg(long)]
    pub fee_rate_wei: Option<String>,

    /// Chain id the signature is bound to.
    #[arg(long, env = "FLINT_CHAIN_ID", default_value_t = 1)]
    pub chain_id: u64,
}

/// Arguments for receipt lookup.
#[derive(Parser, Debug)]
pub struct ReceiptArgs {
    /// JSON-RPC endpoint of a node.
    #[arg(long, env = "FLINT_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: String,

    /// Transaction id, `0x`-hex.
    #[arg(long)]
    pub id: String,
}
