//! Processed-order receipts, keyed on `order_id`.

use rusqlite::{Connection, OptionalExtension};
use revshare_engine::store::OrderReceipt;
use revshare_types::Cents;

use crate::{DbError, Result};

/// Insert a receipt. Fails with a constraint violation if the order already has one.
pub fn insert(conn: &Connection, receipt: &OrderReceipt) -> Result<()> {
    conn.execute(
        "INSERT INTO processed_orders
         (order_id, product_id, total_distributed_cents, investor_count, total_profit_cents, processed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            receipt.order_id,
            receipt.product_id,
            crate::sql_cents("total distributed", receipt.total_distributed)?,
            receipt.investor_count,
            crate::sql_cents("total profit", receipt.total_profit)?,
            receipt.processed_at as i64,
        ],
    )
    .map_err(|e| {
        let err = DbError::Sqlite(e);
        if err.is_constraint_violation() {
            DbError::Constraint(format!("order '{}' already processed", receipt.order_id))
        } else {
            err
        }
    })?;
    Ok(())
}

/// Point-read of a receipt.
pub fn get(conn: &Connection, order_id: &str) -> Result<Option<OrderReceipt>> {
    let receipt = conn
        .query_row(
            "SELECT order_id, product_id, total_distributed_cents, investor_count,
                    total_profit_cents, processed_at
             FROM processed_orders WHERE order_id = ?1",
            [order_id],
            |row| {
                Ok(OrderReceipt {
                    order_id: row.get(0)?,
                    product_id: row.get(1)?,
                    total_distributed: Cents(row.get::<_, i64>(2)? as u64),
                    investor_count: row.get(3)?,
                    total_profit: Cents(row.get::<_, i64>(4)? as u64),
                    processed_at: row.get::<_, i64>(5)? as u64,
                })
            },
        )
        .optional()?;
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt() -> OrderReceipt {
        OrderReceipt {
            order_id: "order-1".to_string(),
            product_id: "prod-1".to_string(),
            total_distributed: Cents(1000),
            investor_count: 2,
            total_profit: Cents(4000),
            processed_at: 1000,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let conn = crate::open_memory().expect("open");
        insert(&conn, &receipt()).expect("insert");
        assert_eq!(get(&conn, "order-1").expect("get"), Some(receipt()));
        assert_eq!(get(&conn, "order-2").expect("get"), None);
    }

    #[test]
    fn test_duplicate_rejected() {
        let conn = crate::open_memory().expect("open");
        insert(&conn, &receipt()).expect("insert");
        let err = insert(&conn, &receipt()).expect_err("duplicate");
        assert!(matches!(err, DbError::Constraint(_)));
    }
}
