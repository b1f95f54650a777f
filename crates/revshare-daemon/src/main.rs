//! revshare-daemon: pays investors their share of product sales.
//!
//! Owns the SQLite ledger and serves JSON-RPC on a Unix socket in the data
//! directory until Ctrl-C or a `shutdown` call.

mod commands;
mod config;
mod rpc;

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::DaemonConfig;
use crate::rpc::RpcServer;

/// State shared by every connection.
pub struct DaemonState {
    /// The ledger. A call holds the lock from its first read to its commit.
    pub db: Arc<Mutex<rusqlite::Connection>>,
    pub config: DaemonConfig,
    pub shutdown_tx: broadcast::Sender<()>,
}

fn init_tracing(config: &DaemonConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(config.log_directive().parse()?);
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DaemonConfig::load()?;
    init_tracing(&config)?;

    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let db_path = config.db_path();
    let conn = revshare_db::open(&db_path)
        .with_context(|| format!("opening ledger {}", db_path.display()))?;
    info!(
        db = ?db_path,
        dedupe_orders = config.revenue.dedupe_orders,
        "ledger ready"
    );

    let socket_path = config.socket_path();
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
    let state = Arc::new(DaemonState {
        db: Arc::new(Mutex::new(conn)),
        config,
        shutdown_tx,
    });
    let server = RpcServer::new(Arc::clone(&state), socket_path.clone());

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!(error = %e, "rpc server stopped");
            }
        }
        _ = shutdown_rx.recv() => info!("shutdown requested over rpc"),
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }

    if let Err(e) = std::fs::remove_file(&socket_path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            error!(error = %e, socket = ?socket_path, "could not remove socket");
        }
    }
    info!("revshare daemon stopped");
    Ok(())
}
