//! Transaction record query functions. Rows are append-only.

use rusqlite::Connection;
use revshare_engine::store::TransactionEntry;
use revshare_types::Cents;

use crate::{DbError, Result};

/// Append a transaction record.
pub fn insert(
    conn: &Connection,
    id: &str,
    user_id: &str,
    entry: &TransactionEntry,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions
         (id, user_id, kind, amount_cents, product_id, order_id, investment_id,
          investment_percentage, ownership_bps, sale_amount_cents, profit_cents,
          revenue_share_percentage, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        rusqlite::params![
            id,
            user_id,
            entry.kind,
            crate::sql_cents("amount", entry.amount)?,
            entry.product_id,
            entry.order_id,
            entry.investment_id,
            entry.investment_percentage,
            entry.ownership_bps,
            crate::sql_cents("sale amount", entry.sale_amount)?,
            crate::sql_cents("profit", entry.profit)?,
            i64::try_from(entry.revenue_share_percentage)
                .map_err(|_| DbError::AmountOverflow("revenue share percentage".into()))?,
            entry.status,
            created_at as i64,
        ],
    )?;
    Ok(())
}

/// Recent transactions for a user, newest first.
pub fn list_for_user(conn: &Connection, user_id: &str, limit: u32) -> Result<Vec<TransactionRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, kind, amount_cents, product_id, order_id, investment_id,
                investment_percentage, ownership_bps, sale_amount_cents, profit_cents,
                revenue_share_percentage, status, created_at
         FROM transactions WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![user_id, limit], map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Every transaction written for an order.
pub fn list_for_order(conn: &Connection, order_id: &str) -> Result<Vec<TransactionRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, kind, amount_cents, product_id, order_id, investment_id,
                investment_percentage, ownership_bps, sale_amount_cents, profit_cents,
                revenue_share_percentage, status, created_at
         FROM transactions WHERE order_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([order_id], map_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok(TransactionRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        amount: Cents(row.get::<_, i64>(3)? as u64),
        product_id: row.get(4)?,
        order_id: row.get(5)?,
        investment_id: row.get(6)?,
        investment_percentage: row.get(7)?,
        ownership_bps: row.get(8)?,
        sale_amount: Cents(row.get::<_, i64>(9)? as u64),
        profit: Cents(row.get::<_, i64>(10)? as u64),
        revenue_share_percentage: row.get::<_, i64>(11)? as u64,
        status: row.get(12)?,
        created_at: row.get::<_, i64>(13)? as u64,
    })
}

/// A raw transaction row.
#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub amount: Cents,
    pub product_id: String,
    pub order_id: String,
    pub investment_id: String,
    pub investment_percentage: f64,
    pub ownership_bps: u32,
    pub sale_amount: Cents,
    pub profit: Cents,
    pub revenue_share_percentage: u64,
    pub status: String,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    fn entry(order_id: &str, amount: u64) -> TransactionEntry {
        TransactionEntry {
            kind: "revenue_share".to_string(),
            amount: Cents(amount),
            product_id: "prod-1".to_string(),
            order_id: order_id.to_string(),
            investment_id: "inv-a".to_string(),
            investment_percentage: 0.6,
            ownership_bps: 6000,
            sale_amount: Cents(4000),
            profit: Cents(4000),
            revenue_share_percentage: 25,
            status: "completed".to_string(),
        }
    }

    #[test]
    fn test_insert_and_list() {
        let conn = test_db();
        insert(&conn, "tx-1", "alice", &entry("order-1", 600), 1000).expect("insert");
        insert(&conn, "tx-2", "alice", &entry("order-2", 300), 1001).expect("insert");
        insert(&conn, "tx-3", "bob", &entry("order-1", 400), 1000).expect("insert");

        let txs = list_for_user(&conn, "alice", 10).expect("list");
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].order_id, "order-2"); // Most recent first
        assert_eq!(txs[1].amount, Cents(600));
        assert_eq!(txs[1].ownership_bps, 6000);
        assert_eq!(txs[1].investment_percentage, 0.6);
        assert_eq!(txs[1].status, "completed");
    }

    #[test]
    fn test_limit() {
        let conn = test_db();
        for n in 0..5 {
            insert(&conn, &format!("tx-{n}"), "alice", &entry("order-1", 1), 1000 + n)
                .expect("insert");
        }
        assert_eq!(list_for_user(&conn, "alice", 3).expect("list").len(), 3);
    }

    #[test]
    fn test_list_for_order() {
        let conn = test_db();
        insert(&conn, "tx-1", "alice", &entry("order-1", 600), 1000).expect("insert");
        insert(&conn, "tx-2", "bob", &entry("order-1", 400), 1000).expect("insert");
        insert(&conn, "tx-3", "bob", &entry("order-2", 400), 1000).expect("insert");

        let txs = list_for_order(&conn, "order-1").expect("list");
        let total: u64 = txs.iter().map(|t| t.amount.get()).sum();
        assert_eq!(total, 1000);
    }
}
