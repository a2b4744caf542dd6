//! braid-node — the braidnet full-node binary.
//!
//! Startup sequence:
//!   1. Resolve configuration (CLI flags over environment)
//!   2. Load the DAG snapshot and replay it into ledger state
//!   3. Run the connect handshake against any bootstrap peers
//!   4. Serve the HTTP API until ctrl-c

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};

use braid_api::routes::nodes::perform_connect;
use braid_api::{router, ApiContext};
use braid_state::{ChainConfig, ChainEngine};
use braid_sync::PeerClient;

mod config;
use config::{Args, NodeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,braid=debug".parse().unwrap()),
        )
        .init();

    let config = NodeConfig::resolve(Args::parse())?;
    info!(api_name = %config.api_name, "braidnet node starting");

    // ── Replica state ─────────────────────────────────────────────────────────
    let chain_config = ChainConfig::new(config.genesis_wallet.clone())
        .with_snapshot_path(config.snapshot_path.clone());
    let engine = ChainEngine::open(chain_config);
    info!(blocks = engine.block_count(), "replica ready");

    // ── Shared context ────────────────────────────────────────────────────────
    let peers = PeerClient::new(config.api_name.clone())
        .map_err(|e| anyhow::anyhow!("building peer client: {e}"))?;
    let context = Arc::new(ApiContext {
        chain: RwLock::new(engine),
        peers,
        own_url: config.validated_external_url()?,
    });

    // ── Bootstrap peers ───────────────────────────────────────────────────────
    for peer in &config.bootstrap_peers {
        match perform_connect(&context, peer.clone()).await {
            Ok(url) => info!(peer = %url, "bootstrap handshake complete"),
            Err(e) => warn!(peer = %peer, detail = %e.detail, "bootstrap handshake failed"),
        }
    }

    // ── HTTP server ───────────────────────────────────────────────────────────
    let app = router(context, &config.api_name);
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(addr = %config.listen, "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving API")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("shutdown signal received");
}
