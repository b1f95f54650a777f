//! Newline-delimited JSON-RPC 2.0 over a Unix socket.
//!
//! Each line a client writes is one request; each line written back is the
//! matching response. Handler errors become [`RpcError`] objects whose
//! `data.kind` is one of `invalid-argument`, `not-found` or `internal`.

use std::path::PathBuf;
use std::sync::Arc;

use revshare_db::DbError;
use revshare_engine::{ErrorKind, RevenueError};
use revshare_types::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use crate::commands::{catalog, ledger, revenue};
use crate::DaemonState;

const JSONRPC_VERSION: &str = "2.0";

/// An incoming call.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    /// Absent params are treated as `null`.
    #[serde(default)]
    pub params: Value,
}

/// Reply to one [`RpcRequest`]. Exactly one of `result` / `error` is set.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    fn bare(code: i32, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: None,
        }
    }

    fn classified(code: i32, message: &str, kind: ErrorKind, detail: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: Some(json!({ "kind": kind.as_str(), "detail": detail })),
        }
    }

    /// -32700: the line was not valid JSON.
    pub fn parse_error() -> Self {
        Self::bare(-32700, "PARSE_ERROR")
    }

    /// -32600: valid JSON, but not a 2.0 request.
    pub fn invalid_request() -> Self {
        Self::bare(-32600, "INVALID_REQUEST")
    }

    /// -32601
    pub fn method_not_found(method: &str) -> Self {
        Self {
            data: Some(json!({ "method": method })),
            ..Self::bare(-32601, "METHOD_NOT_FOUND")
        }
    }

    /// -32602, `invalid-argument`.
    pub fn invalid_params(detail: &str) -> Self {
        Self::classified(-32602, "INVALID_PARAMS", ErrorKind::InvalidArgument, detail)
    }

    /// -32603, `internal`. Callers log the cause; it never reaches the client.
    pub fn internal_error() -> Self {
        Self::classified(-32603, "INTERNAL_ERROR", ErrorKind::Internal, "internal error")
    }

    /// -32004, `not-found`.
    pub fn not_found(detail: &str) -> Self {
        Self::classified(-32004, "NOT_FOUND", ErrorKind::NotFound, detail)
    }

    /// -32009, `invalid-argument`: a record with that id already exists.
    pub fn already_exists(detail: &str) -> Self {
        Self::classified(-32009, "ALREADY_EXISTS", ErrorKind::InvalidArgument, detail)
    }

    /// The `data.kind` field, if any.
    pub fn kind(&self) -> Option<&str> {
        self.data.as_ref()?.get("kind")?.as_str()
    }
}

impl From<ValidationError> for RpcError {
    fn from(e: ValidationError) -> Self {
        RpcError::invalid_params(&e.to_string())
    }
}

impl From<RevenueError> for RpcError {
    fn from(e: RevenueError) -> Self {
        match e.kind() {
            ErrorKind::InvalidArgument => RpcError::invalid_params(&e.to_string()),
            ErrorKind::NotFound => RpcError::not_found(&e.to_string()),
            ErrorKind::Internal => {
                error!(error = %e, "revenue distribution failed");
                RpcError::internal_error()
            }
        }
    }
}

impl From<DbError> for RpcError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(detail) => RpcError::not_found(&detail),
            overflow @ DbError::AmountOverflow(_) => {
                RpcError::invalid_params(&overflow.to_string())
            }
            ref other if other.is_constraint_violation() => {
                RpcError::already_exists(&other.to_string())
            }
            other => {
                error!(error = %other, "database error");
                RpcError::internal_error()
            }
        }
    }
}

/// Accepts client connections and serves each on its own task.
pub struct RpcServer {
    state: Arc<DaemonState>,
    socket_path: PathBuf,
}

impl RpcServer {
    pub fn new(state: Arc<DaemonState>, socket_path: PathBuf) -> Self {
        Self { state, socket_path }
    }

    /// Bind the socket and serve until the task is dropped.
    ///
    /// A socket file left behind by an earlier run is replaced.
    pub async fn run(&self) -> anyhow::Result<()> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }
        let listener = UnixListener::bind(&self.socket_path)?;
        info!(socket = ?self.socket_path, "accepting RPC connections");

        loop {
            let stream = match listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    error!(error = %e, "accept failed");
                    continue;
                }
            };
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                if let Err(e) = serve_connection(state, stream).await {
                    warn!(error = %e, "client connection closed with error");
                }
            });
        }
    }
}

async fn serve_connection(state: Arc<DaemonState>, stream: UnixStream) -> anyhow::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(&state, &line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        write_half.write_all(&encoded).await?;
    }
    Ok(())
}

/// Decode one request line and produce its response.
pub async fn handle_line(state: &Arc<DaemonState>, line: &str) -> RpcResponse {
    let request = match serde_json::from_str::<RpcRequest>(line) {
        Ok(request) => request,
        Err(_) => return RpcResponse::failure(Value::Null, RpcError::parse_error()),
    };
    if request.jsonrpc != JSONRPC_VERSION {
        return RpcResponse::failure(request.id, RpcError::invalid_request());
    }

    debug!(method = %request.method, "rpc call");
    match dispatch(state, &request.method, &request.params).await {
        Ok(value) => RpcResponse::success(request.id, value),
        Err(err) => RpcResponse::failure(request.id, err),
    }
}

async fn dispatch(
    state: &Arc<DaemonState>,
    method: &str,
    params: &Value,
) -> Result<Value, RpcError> {
    match method {
        "distribute_revenue" => revenue::distribute_revenue(state, params).await,

        "create_product" => catalog::create_product(state, params).await,
        "record_investment" => catalog::record_investment(state, params).await,
        "get_product" => catalog::get_product(state, params).await,
        "get_user_investments" => catalog::get_user_investments(state, params).await,

        "get_wallet_balance" => ledger::get_wallet_balance(state, params).await,
        "get_transactions" => ledger::get_transactions(state, params).await,
        "get_notifications" => ledger::get_notifications(state, params).await,
        "mark_notification_read" => ledger::mark_notification_read(state, params).await,

        "shutdown" => {
            // No receivers only means the daemon is already stopping.
            let _ = state.shutdown_tx.send(());
            Ok(json!({ "stopping": true }))
        }

        other => Err(RpcError::method_not_found(other)),
    }
}
