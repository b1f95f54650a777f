//! Wallet, transaction and notification command handlers.

use std::sync::Arc;

use revshare_db::queries::{notifications, transactions, wallets};
use revshare_types::sale::required_str;
use serde_json::Value;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

const DEFAULT_TRANSACTION_LIMIT: u32 = 100;
const MAX_TRANSACTION_LIMIT: u32 = 500;

/// Get a user's wallet balance. Users without a wallet have a zero balance.
pub async fn get_wallet_balance(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = required_str(params, "userId")?;

    let db = state.db.lock().await;
    let wallet = wallets::get(&db, &user_id)?;
    let (balance, updated_at) = wallet
        .map(|w| (w.balance, Some(w.updated_at)))
        .unwrap_or_default();

    Ok(serde_json::json!({
        "userId": user_id,
        "balance": balance.to_dollars(),
        "balanceCents": balance.get(),
        "updatedAt": updated_at,
    }))
}

/// Recent transactions for a user, newest first.
pub async fn get_transactions(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = required_str(params, "userId")?;
    let limit = match params.get("limit") {
        None | Some(Value::Null) => DEFAULT_TRANSACTION_LIMIT,
        Some(v) => v
            .as_u64()
            .map(|n| n.min(u64::from(MAX_TRANSACTION_LIMIT)) as u32)
            .ok_or_else(|| RpcError::invalid_params("limit must be a non-negative integer"))?,
    };

    let db = state.db.lock().await;
    let rows = transactions::list_for_user(&db, &user_id, limit)?;

    let result: Vec<Value> = rows
        .iter()
        .map(|tx| {
            serde_json::json!({
                "id": tx.id,
                "type": tx.kind,
                "amount": tx.amount.to_dollars(),
                "productId": tx.product_id,
                "orderId": tx.order_id,
                "investmentId": tx.investment_id,
                "investmentPercentage": tx.investment_percentage,
                "ownershipBps": tx.ownership_bps,
                "saleAmount": tx.sale_amount.to_dollars(),
                "profit": tx.profit.to_dollars(),
                "revenueSharePercentage": tx.revenue_share_percentage,
                "status": tx.status,
                "createdAt": tx.created_at,
            })
        })
        .collect();

    Ok(serde_json::json!(result))
}

/// Notifications for a user, newest first.
pub async fn get_notifications(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = required_str(params, "userId")?;
    let unread_only = params
        .get("unreadOnly")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let db = state.db.lock().await;
    let rows = notifications::list_for_user(&db, &user_id, unread_only)?;

    serde_json::to_value(rows).map_err(|e| {
        tracing::error!(error = %e, "failed to encode notifications");
        RpcError::internal_error()
    })
}

/// Mark a notification as read.
pub async fn mark_notification_read(state: &Arc<DaemonState>, params: &Value) -> Result {
    let notification_id = required_str(params, "notificationId")?;

    let db = state.db.lock().await;
    notifications::mark_read(&db, &notification_id)?;

    Ok(serde_json::json!({ "notificationId": notification_id, "read": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{catalog, revenue, test_state};
    use serde_json::json;

    async fn distributed_state() -> Arc<DaemonState> {
        let state = test_state();
        catalog::create_product(&state, &json!({"productId": "p1", "name": "Kettle"}))
            .await
            .expect("create");
        catalog::record_investment(
            &state,
            &json!({"productId": "p1", "userId": "alice", "amount": 50}),
        )
        .await
        .expect("invest");
        revenue::distribute_revenue(
            &state,
            &json!({"productId": "p1", "saleAmount": 19.99, "manufacturingCost": 5,
                    "quantity": 2, "orderId": "order-9"}),
        )
        .await
        .expect("distribute");
        state
    }

    #[tokio::test]
    async fn test_unknown_user_has_zero_balance() {
        let state = test_state();
        let resp = get_wallet_balance(&state, &json!({"userId": "ghost"}))
            .await
            .expect("balance");
        assert_eq!(resp["balanceCents"], 0);
        assert!(resp["updatedAt"].is_null());
    }

    #[tokio::test]
    async fn test_transaction_record_fields() {
        let state = distributed_state().await;
        let txs = get_transactions(&state, &json!({"userId": "alice"}))
            .await
            .expect("transactions");
        let tx = &txs[0];
        // profit 19.99 - 10.00 = 9.99, pool floor(999 * 25 / 100) = 249 cents
        assert_eq!(tx["type"], "revenue_share");
        assert_eq!(tx["amount"], 2.49);
        assert_eq!(tx["profit"], 9.99);
        assert_eq!(tx["orderId"], "order-9");
        assert_eq!(tx["ownershipBps"], 10_000);
        assert_eq!(tx["revenueSharePercentage"], 25);
        assert_eq!(tx["status"], "completed");
    }

    #[tokio::test]
    async fn test_transaction_limit_rejects_garbage() {
        let state = test_state();
        let err = get_transactions(&state, &json!({"userId": "alice", "limit": "all"}))
            .await
            .expect_err("bad limit");
        assert_eq!(err.kind(), Some("invalid-argument"));
    }

    #[tokio::test]
    async fn test_notification_read_flow() {
        let state = distributed_state().await;
        let unread = get_notifications(&state, &json!({"userId": "alice", "unreadOnly": true}))
            .await
            .expect("notifications");
        let id = unread[0]["id"].as_str().expect("id").to_string();
        assert_eq!(unread[0]["message"], "You earned $2.49 from a sale of Kettle");

        mark_notification_read(&state, &json!({"notificationId": id}))
            .await
            .expect("mark");

        let unread = get_notifications(&state, &json!({"userId": "alice", "unreadOnly": true}))
            .await
            .expect("notifications");
        assert_eq!(unread.as_array().map(Vec::len), Some(0));

        let all = get_notifications(&state, &json!({"userId": "alice"}))
            .await
            .expect("notifications");
        assert_eq!(all[0]["read"], true);
    }

    #[tokio::test]
    async fn test_mark_unknown_notification() {
        let state = test_state();
        let err = mark_notification_read(&state, &json!({"notificationId": "nope"}))
            .await
            .expect_err("missing");
        assert_eq!(err.kind(), Some("not-found"));
    }
}
