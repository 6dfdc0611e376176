// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Flint CLI
//!
//! Entry point for the `flint` binary. Parses arguments, initializes
//! logging, and drives the wallet library. Results go to stdout; logs go
//! to stderr; secrets go nowhere.
//!
//! Supported subcommands:
//!
//! - `generate` — create a fresh keypair
//! - `address`  — derive the address for a secret key
//! - `sign`     — build and sign a transfer offline, print raw hex
//! - `send`     — broadcast raw transaction hex
//! - `transfer` — resolve, build, sign, and broadcast in one step
//! - `receipt`  — look up a transaction receipt

mod cli;
mod logging;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use primitive_types::U256;
use tracing::info;

use flint_wallet::chain::broadcaster::Broadcaster;
use flint_wallet::chain::client::{ChainClient, HttpChainClient, ReceiptStatus};
use flint_wallet::chain::sender::{TransactionSender, TransferIntent};
use flint_wallet::config::chain_name;
use flint_wallet::crypto::keys::Keypair;
use flint_wallet::transaction::builder::TransactionBuilder;
use flint_wallet::transaction::encoding::{decode, DecodedTransaction};
use flint_wallet::transaction::signing::sign;
use flint_wallet::types::{Address, TransactionId};

use cli::{Commands, FlintCli};
use logging::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let args = FlintCli::parse();

    let format = std::env::var("FLINT_LOG_FORMAT")
        .map(|s| LogFormat::from_str_lossy(&s))
        .unwrap_or(LogFormat::Pretty);
    logging::init_logging("info", format);

    match args.command {
        Commands::Generate => generate(),
        Commands::Address(args) => address(&args.key),
        Commands::Sign(args) => sign_offline(args),
        Commands::Send(args) => send_raw(args).await,
        Commands::Transfer(args) => transfer(args).await,
        Commands::Receipt(args) => receipt(args).await,
    }
}

fn generate() -> Result<()> {
    let keypair = Keypair::generate().context("generating a keypair")?;
    println!("address:    {}", keypair.address());
    println!("public key: 0x{}", keypair.public_key_hex());
    println!("secret key: 0x{}", keypair.secret_key_hex());
    eprintln!("note: anyone holding the secret key holds the funds; store it accordingly");
    Ok(())
}

fn address(key: &str) -> Result<()> {
    let keypair = Keypair::from_hex(key).context("parsing the secret key")?;
    println!("{}", keypair.address());
    Ok(())
}

fn sign_offline(args: cli::SignArgs) -> Result<()> {
    let keypair = Keypair::from_hex(&args.key).context("parsing the secret key")?;
    let recipient: Address = args.to.parse().context("parsing the recipient address")?;
    let value = parse_wei(&args.value_wei).context("parsing --value-wei")?;
    let fee_rate = parse_wei(&args.fee_rate_wei).context("parsing --fee-rate-wei")?;
    let payload = match &args.payload {
        Some(hex_str) => hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str))
            .context("parsing --payload")?,
        None => Vec::new(),
    };

    let tx = TransactionBuilder::new()
        .sequence(args.sequence)
        .recipient(recipient)
        .value(value)
        .fee_limit(args.fee_limit)
        .fee_rate(fee_rate)
        .payload(payload)
        .build()
        .context("validating the transfer intent")?;

    let stx = sign(&tx, &keypair, args.chain_id).context("signing")?;
    info!(
        chain = %chain_name(args.chain_id),
        sequence = args.sequence,
        id = %stx.id(),
        "transaction signed offline"
    );
    println!("0x{}", hex::encode(stx.to_wire_bytes()));
    Ok(())
}

async fn send_raw(args: cli::SendArgs) -> Result<()> {
    let raw = hex::decode(args.raw.strip_prefix("0x").unwrap_or(&args.raw))
        .context("parsing --raw as hex")?;

    // Decode before sending: a canonical-form failure here is a better
    // error than whatever the node would have said.
    let stx = match decode(&raw).context("decoding raw transaction bytes")? {
        DecodedTransaction::Signed(stx) => stx,
        DecodedTransaction::Unsigned(_) => bail!("raw bytes decode to an unsigned transaction"),
    };

    let client: Arc<dyn ChainClient> = Arc::new(HttpChainClient::new(args.rpc_url));
    let id = Broadcaster::new(client).submit(&stx).await?;
    println!("{}", id);
    Ok(())
}

async fn transfer(args: cli::TransferArgs) -> Result<()> {
    let keypair = Keypair::from_hex(&args.key).context("parsing the secret key")?;
    let recipient: Address = args.to.parse().context("parsing the recipient address")?;
    let value = parse_wei(&args.value_wei).context("parsing --value-wei")?;
    let fee_rate = args
        .fee_rate_wei
        .as_deref()
        .map(parse_wei)
        .transpose()
        .context("parsing --fee-rate-wei")?;

    info!(
        chain = %chain_name(args.chain_id),
        from = %keypair.address(),
        to = %recipient,
        "starting transfer"
    );

    let client: Arc<dyn ChainClient> = Arc::new(HttpChainClient::new(args.rpc_url));
    let sender = TransactionSender::new(client);
    let id = sender
        .send(
            &keypair,
            args.chain_id,
            TransferIntent {
                recipient: Some(recipient),
                value,
                fee_limit: args.fee_limit,
                fee_rate,
                payload: Vec::new(),
            },
        )
        .await?;
    println!("{}", id);
    Ok(())
}

async fn receipt(args: cli::ReceiptArgs) -> Result<()> {
    let id: TransactionId = args.id.parse().context("parsing --id")?;
    let client = HttpChainClient::new(args.rpc_url);

    match client.transaction_receipt(id).await? {
        Some(receipt) => match receipt.status {
            ReceiptStatus::Success => println!("success"),
            ReceiptStatus::Failure => println!("failure"),
        },
        None => println!("not found (unknown or not yet included)"),
    }
    Ok(())
}

/// Parse a decimal wei amount into a U256.
fn parse_wei(text: &str) -> Result<U256> {
    U256::from_dec_str(text.trim()).with_context(|| format!("{:?} is not a decimal amount", text))
}
