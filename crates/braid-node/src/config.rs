use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use braid_core::types::WalletId;

/// Environment variables recognised by the node. CLI flags take
/// precedence.
const ENV_API_NAME: &str = "API_NAME";
const ENV_GENESIS_PUBLIC_KEY: &str = "GENESIS_PUBLIC_KEY";
const ENV_IS_PRODUCTION: &str = "IS_PRODUCTION";
const ENV_PRODUCTION_SERVER_URL: &str = "PRODUCTION_SERVER_URL";
const ENV_LOCALHOST_SERVER_URL: &str = "LOCALHOST_SERVER_URL";

#[derive(Parser, Debug)]
#[command(
    name = "braid-node",
    version,
    about = "braidnet full node — a DAG ledger with post-quantum signatures"
)]
pub struct Args {
    /// HTTP listen address.
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub listen: SocketAddr,

    /// API name segment in `/api/v1/<api_name>/` (env: API_NAME).
    #[arg(long)]
    pub api_name: Option<String>,

    /// Base64 Dilithium2 public key holding the genesis endowment
    /// (env: GENESIS_PUBLIC_KEY).
    #[arg(long)]
    pub genesis_key: Option<String>,

    /// Snapshot file for the DAG.
    #[arg(long, default_value = "braidnet.json")]
    pub snapshot_path: PathBuf,

    /// URL peers should use to reach this node. Defaults to
    /// PRODUCTION_SERVER_URL when IS_PRODUCTION=1, else
    /// LOCALHOST_SERVER_URL, else the listen address.
    #[arg(long)]
    pub external_url: Option<String>,

    /// Peers to run the connect handshake against at startup
    /// (comma-separated URLs).
    #[arg(long, value_delimiter = ',')]
    pub connect: Vec<String>,
}

/// Fully resolved node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub listen: SocketAddr,
    pub api_name: String,
    pub genesis_wallet: WalletId,
    pub snapshot_path: PathBuf,
    pub external_url: String,
    pub bootstrap_peers: Vec<String>,
}

impl NodeConfig {
    pub fn resolve(args: Args) -> anyhow::Result<Self> {
        let api_name = args
            .api_name
            .or_else(|| env_var(ENV_API_NAME))
            .unwrap_or_else(|| "braidnet".to_string());

        let genesis_key = match args.genesis_key.or_else(|| env_var(ENV_GENESIS_PUBLIC_KEY)) {
            Some(key) => key,
            None => bail!(
                "no genesis wallet configured; pass --genesis-key or set {}",
                ENV_GENESIS_PUBLIC_KEY
            ),
        };

        let external_url = args
            .external_url
            .or_else(default_external_url)
            .unwrap_or_else(|| format!("http://{}/", args.listen));

        Ok(Self {
            listen: args.listen,
            api_name,
            genesis_wallet: WalletId::new(genesis_key),
            snapshot_path: args.snapshot_path,
            external_url,
            bootstrap_peers: args.connect,
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Production URL when IS_PRODUCTION=1, localhost URL otherwise.
fn default_external_url() -> Option<String> {
    let is_production = env_var(ENV_IS_PRODUCTION)
        .and_then(|v| v.parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(false);
    if is_production {
        env_var(ENV_PRODUCTION_SERVER_URL)
    } else {
        env_var(ENV_LOCALHOST_SERVER_URL)
    }
}

impl NodeConfig {
    /// The URL announced in reciprocal connects, with a sanity check.
    pub fn validated_external_url(&self) -> anyhow::Result<String> {
        if !self.external_url.starts_with("http") {
            bail!("external URL must start with http: {}", self.external_url);
        }
        Ok(self.external_url.clone())
    }
}
