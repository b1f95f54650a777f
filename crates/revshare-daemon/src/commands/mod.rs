//! IPC command handlers.
//!
//! Each submodule implements the commands for one IPC category.

pub mod catalog;
pub mod ledger;
pub mod revenue;

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Daemon state over an in-memory database.
#[cfg(test)]
pub fn test_state() -> std::sync::Arc<crate::DaemonState> {
    let conn = revshare_db::open_memory().expect("open test db");
    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
    std::sync::Arc::new(crate::DaemonState {
        db: std::sync::Arc::new(tokio::sync::Mutex::new(conn)),
        config: crate::config::DaemonConfig::default(),
        shutdown_tx,
    })
}
