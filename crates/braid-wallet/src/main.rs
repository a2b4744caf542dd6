//! braid-wallet
//!
//! CLI wallet for braidnet. Manages Dilithium2 keypairs, signs transfers,
//! and submits them to a running node over its REST API.
//!
//! Usage:
//!   braid-wallet keygen   [--keyfile <path>]
//!   braid-wallet balance  [--account <b64-key>] [--node <url>]
//!   braid-wallet nonce    [--account <b64-key>] [--node <url>]
//!   braid-wallet transfer --to <b64-key> --amount <minor-units> [--node <url>]

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use braid_core::transaction::{signing_preimage, TransactionCreate};
use braid_core::types::WalletId;
use braid_crypto::KeyPair;

mod rest_client;
use rest_client::NodeClient;

#[derive(Parser, Debug)]
#[command(
    name = "braid-wallet",
    version,
    about = "braidnet wallet — sign and submit transfers"
)]
struct Args {
    /// Path to the keyfile (JSON).
    #[arg(long, global = true, default_value = "wallet.json")]
    keyfile: PathBuf,

    /// Node base URL.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8000")]
    node: String,

    /// API name segment of the node's routes.
    #[arg(long, global = true, default_value = "braidnet")]
    api_name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new Dilithium2 keypair and save it to the keyfile.
    Keygen,

    /// Print a wallet's display balance.
    Balance {
        /// Wallet to query (base64 public key). Defaults to the keyfile's.
        #[arg(long)]
        account: Option<String>,
    },

    /// Print a wallet's last admitted nonce.
    Nonce {
        /// Wallet to query (base64 public key). Defaults to the keyfile's.
        #[arg(long)]
        account: Option<String>,
    },

    /// Sign and submit a transfer.
    Transfer {
        /// Recipient public key (base64).
        #[arg(long)]
        to: String,
        /// Amount in minor units (display value × 100 at default decimals).
        #[arg(long)]
        amount: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = NodeClient::new(&args.node, &args.api_name);

    match args.command {
        Command::Keygen => keygen(&args.keyfile),
        Command::Balance { account } => {
            let wallet = resolve_account(account, &args.keyfile)?;
            let balance = client.get_balance(&wallet).await?;
            println!("balance: {balance:.2}");
            Ok(())
        }
        Command::Nonce { account } => {
            let wallet = resolve_account(account, &args.keyfile)?;
            let nonce = client.get_nonce(&wallet).await?;
            println!("nonce: {nonce}");
            Ok(())
        }
        Command::Transfer { to, amount } => transfer(&client, &args.keyfile, to, amount).await,
    }
}

fn keygen(keyfile: &PathBuf) -> anyhow::Result<()> {
    if keyfile.exists() {
        bail!(
            "refusing to overwrite existing keyfile {}",
            keyfile.display()
        );
    }
    let kp = KeyPair::generate();
    let json = serde_json::to_string_pretty(&kp).context("encoding keypair")?;
    std::fs::write(keyfile, json)
        .with_context(|| format!("writing keyfile {}", keyfile.display()))?;
    println!("keyfile written to {}", keyfile.display());
    println!("public key: {}", kp.public_key);
    Ok(())
}

fn load_keypair(keyfile: &PathBuf) -> anyhow::Result<KeyPair> {
    let json = std::fs::read_to_string(keyfile)
        .with_context(|| format!("reading keyfile {}", keyfile.display()))?;
    serde_json::from_str(&json).context("parsing keyfile")
}

fn resolve_account(account: Option<String>, keyfile: &PathBuf) -> anyhow::Result<WalletId> {
    match account {
        Some(key) => Ok(WalletId::new(key)),
        None => Ok(load_keypair(keyfile)?.public_key.clone()),
    }
}

async fn transfer(
    client: &NodeClient,
    keyfile: &PathBuf,
    to: String,
    amount: u64,
) -> anyhow::Result<()> {
    let kp = load_keypair(keyfile)?;
    let recipient = WalletId::new(to);

    // Build on top of whatever the node has already admitted from us.
    let nonce = client.get_nonce(&kp.public_key).await? + 1;

    let preimage = signing_preimage(&kp.public_key, &recipient, amount, nonce);
    let signature = kp.sign(&preimage).context("signing transaction")?;

    let tx = TransactionCreate {
        sender: kp.public_key.clone(),
        recipient,
        amount,
        nonce,
        signature,
        timestamp: None,
    };

    let admitted = client.post_transaction(&tx).await?;
    println!("transaction admitted:");
    println!("{}", serde_json::to_string_pretty(&admitted)?);
    Ok(())
}
