//! Revenue distribution command handler.

use std::sync::Arc;

use revshare_db::SqliteLedger;
use revshare_engine::distributor::distribute_sale;
use revshare_types::{DistributionResponse, DistributionResult, SaleEvent};
use serde_json::Value;

use crate::commands::unix_now;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Distribute the investor share of one sale.
///
/// Params: `{productId, saleAmount, manufacturingCost, quantity, orderId}`,
/// amounts in dollars.
pub async fn distribute_revenue(state: &Arc<DaemonState>, params: &Value) -> Result {
    let sale = SaleEvent::from_json(params)?;

    let mut db = state.db.lock().await;
    let mut ledger = SqliteLedger::new(&mut db);
    let result = distribute_sale(
        &mut ledger,
        &sale,
        &state.config.distributor_options(),
        unix_now(),
    )?;

    response(&result)
}

/// Caller-facing JSON for a distribution result.
fn response(result: &DistributionResult) -> Result {
    serde_json::to_value(DistributionResponse::from(result)).map_err(|e| {
        tracing::error!(error = %e, "failed to encode distribution response");
        RpcError::internal_error()
    })
}
