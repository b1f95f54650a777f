//! Product and investment command handlers.

use std::sync::Arc;

use revshare_db::queries::{investments, products};
use revshare_types::money::parse_cents;
use revshare_types::sale::required_str;
use revshare_types::{Investment, ValidationError};
use serde_json::Value;

use crate::commands::unix_now;
use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Register a product with zero funding.
pub async fn create_product(state: &Arc<DaemonState>, params: &Value) -> Result {
    let product_id = required_str(params, "productId")?;
    let name = required_str(params, "name")?;

    let db = state.db.lock().await;
    products::insert(&db, &product_id, &name, unix_now())?;
    tracing::info!(product = %product_id, "product created");

    Ok(serde_json::json!({ "productId": product_id }))
}

/// Record an investment and add it to the product's funding.
///
/// Params: `{investmentId?, productId, userId, amount}`, amount in dollars.
pub async fn record_investment(state: &Arc<DaemonState>, params: &Value) -> Result {
    let product_id = required_str(params, "productId")?;
    let user_id = required_str(params, "userId")?;
    let amount = parse_cents("amount", params.get("amount"))?;
    if amount.is_zero() {
        return Err(ValidationError::OutOfRange {
            field: "amount",
            reason: "must be at least one cent",
        }
        .into());
    }
    let id = match params.get("investmentId") {
        None | Some(Value::Null) => revshare_db::new_id(),
        Some(_) => required_str(params, "investmentId")?,
    };

    let mut db = state.db.lock().await;
    if products::get(&db, &product_id)?.is_none() {
        return Err(RpcError::not_found(&format!("product '{product_id}'")));
    }

    let investment = Investment {
        id,
        product_id,
        user_id,
        amount,
    };
    investments::record(&mut db, &investment, unix_now())?;
    tracing::info!(
        product = %investment.product_id,
        investment = %investment.id,
        amount = %investment.amount,
        "investment recorded"
    );

    Ok(serde_json::json!({
        "investmentId": investment.id,
        "amount": investment.amount.to_dollars(),
    }))
}

/// Product with its current funding and investments.
pub async fn get_product(state: &Arc<DaemonState>, params: &Value) -> Result {
    let product_id = required_str(params, "productId")?;

    let db = state.db.lock().await;
    let product = products::get(&db, &product_id)?
        .ok_or_else(|| RpcError::not_found(&format!("product '{product_id}'")))?;
    let investments = investments::list_by_product(&db, &product_id)?;

    let investments: Vec<Value> = investments
        .iter()
        .map(|inv| {
            serde_json::json!({
                "id": inv.id,
                "userId": inv.user_id,
                "amount": inv.amount.to_dollars(),
            })
        })
        .collect();

    Ok(serde_json::json!({
        "id": product.id,
        "name": product.name,
        "currentFunding": product.current_funding.to_dollars(),
        "investments": investments,
    }))
}

/// Every investment a user holds, across products.
pub async fn get_user_investments(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = required_str(params, "userId")?;

    let db = state.db.lock().await;
    let held = investments::list_by_user(&db, &user_id)?;

    let result: Vec<Value> = held
        .iter()
        .map(|inv| {
            serde_json::json!({
                "id": inv.id,
                "productId": inv.product_id,
                "amount": inv.amount.to_dollars(),
            })
        })
        .collect();

    Ok(Value::Array(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_state;
    use serde_json::json;

    #[tokio::test]
    async fn test_funding_tracks_investments() {
        let state = test_state();
        create_product(&state, &json!({"productId": "p1", "name": "Chair"}))
            .await
            .expect("create");
        for (user, amount) in [("alice", 12.5), ("bob", 7.5)] {
            record_investment(
                &state,
                &json!({"productId": "p1", "userId": user, "amount": amount}),
            )
            .await
            .expect("invest");
        }

        let product = get_product(&state, &json!({"productId": "p1"}))
            .await
            .expect("get");
        assert_eq!(product["currentFunding"], 20.0);
        assert_eq!(product["investments"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_duplicate_product_rejected() {
        let state = test_state();
        let params = json!({"productId": "p1", "name": "Chair"});
        create_product(&state, &params).await.expect("create");
        let err = create_product(&state, &params).await.expect_err("duplicate");
        assert_eq!(err.code, -32009);
    }

    #[tokio::test]
    async fn test_investment_needs_product() {
        let state = test_state();
        let err = record_investment(
            &state,
            &json!({"productId": "missing", "userId": "alice", "amount": 10}),
        )
        .await
        .expect_err("no product");
        assert_eq!(err.kind(), Some("not-found"));
    }

    #[tokio::test]
    async fn test_investment_amount_validated() {
        let state = test_state();
        create_product(&state, &json!({"productId": "p1", "name": "Chair"}))
            .await
            .expect("create");
        for amount in [json!(0), json!(-3), json!("ten")] {
            let err = record_investment(
                &state,
                &json!({"productId": "p1", "userId": "alice", "amount": amount}),
            )
            .await
            .expect_err("bad amount");
            assert_eq!(err.kind(), Some("invalid-argument"));
        }
    }

    #[tokio::test]
    async fn test_funding_overflow_rejected() {
        let state = test_state();
        create_product(&state, &json!({"productId": "p1", "name": "Chair"}))
            .await
            .expect("create");
        let invest = |amount: Value| {
            let state = Arc::clone(&state);
            async move {
                record_investment(
                    &state,
                    &json!({"productId": "p1", "userId": "alice", "amount": amount}),
                )
                .await
            }
        };

        invest(json!(6e16)).await.expect("first fits");
        let err = invest(json!(6e16)).await.expect_err("total exceeds storage");
        assert_eq!(err.code, -32602);
        assert_eq!(err.kind(), Some("invalid-argument"));

        let err = invest(json!(1e17)).await.expect_err("single amount too large");
        assert_eq!(err.code, -32602);
        assert!(err.data.as_ref().expect("data")["detail"]
            .as_str()
            .expect("detail")
            .contains("exceeds the maximum amount"));

        // The product stays readable and only the first investment counts.
        let product = get_product(&state, &json!({"productId": "p1"}))
            .await
            .expect("get");
        assert_eq!(product["currentFunding"], 6e16);
        assert_eq!(product["investments"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_explicit_investment_id() {
        let state = test_state();
        create_product(&state, &json!({"productId": "p1", "name": "Chair"}))
            .await
            .expect("create");
        let resp = record_investment(
            &state,
            &json!({"investmentId": "inv-7", "productId": "p1", "userId": "alice", "amount": 5}),
        )
        .await
        .expect("invest");
        assert_eq!(resp["investmentId"], "inv-7");
    }

    #[tokio::test]
    async fn test_user_investments_span_products() {
        let state = test_state();
        for id in ["p1", "p2"] {
            create_product(&state, &json!({"productId": id, "name": "Chair"}))
                .await
                .expect("create");
            record_investment(
                &state,
                &json!({"productId": id, "userId": "alice", "amount": 3}),
            )
            .await
            .expect("invest");
        }

        let held = get_user_investments(&state, &json!({"userId": "alice"}))
            .await
            .expect("list");
        assert_eq!(held.as_array().map(Vec::len), Some(2));
        let none = get_user_investments(&state, &json!({"userId": "bob"}))
            .await
            .expect("list");
        assert_eq!(none, json!([]));
    }

    #[tokio::test]
    async fn test_missing_product() {
        let state = test_state();
        let err = get_product(&state, &json!({"productId": "nope"}))
            .await
            .expect_err("missing");
        assert_eq!(err.code, -32004);
    }
}
