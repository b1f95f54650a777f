//! Investment query functions.

use rusqlite::Connection;
use revshare_types::{Cents, Investment};

use crate::{queries::products, Result};

/// Insert an investment row without touching product funding.
pub fn insert(conn: &Connection, investment: &Investment, created_at: u64) -> Result<()> {
    conn.execute(
        "INSERT INTO investments (id, product_id, user_id, amount_cents, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            investment.id,
            investment.product_id,
            investment.user_id,
            crate::sql_cents("investment", investment.amount)?,
            created_at as i64,
        ],
    )?;
    Ok(())
}

/// Record an investment and add it to the product's funding in one transaction.
///
/// Keeps `products.current_funding_cents` equal to the sum of its investments.
pub fn record(conn: &mut Connection, investment: &Investment, created_at: u64) -> Result<()> {
    let tx = conn.transaction()?;
    insert(&tx, investment, created_at)?;
    products::add_funding(&tx, &investment.product_id, investment.amount)?;
    tx.commit()?;
    Ok(())
}

/// All investments in a product.
pub fn list_by_product(conn: &Connection, product_id: &str) -> Result<Vec<Investment>> {
    query(
        conn,
        "SELECT id, product_id, user_id, amount_cents FROM investments
         WHERE product_id = ?1 ORDER BY created_at, id",
        product_id,
    )
}

/// All investments held by a user.
pub fn list_by_user(conn: &Connection, user_id: &str) -> Result<Vec<Investment>> {
    query(
        conn,
        "SELECT id, product_id, user_id, amount_cents FROM investments
         WHERE user_id = ?1 ORDER BY created_at, id",
        user_id,
    )
}

fn query(conn: &Connection, sql: &str, key: &str) -> Result<Vec<Investment>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([key], |row| {
            Ok(Investment {
                id: row.get(0)?,
                product_id: row.get(1)?,
                user_id: row.get(2)?,
                amount: Cents(row.get::<_, i64>(3)? as u64),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        products::insert(&conn, "prod-1", "Desk Lamp", 100).expect("product");
        conn
    }

    fn investment(id: &str, user: &str, amount: u64) -> Investment {
        Investment {
            id: id.to_string(),
            product_id: "prod-1".to_string(),
            user_id: user.to_string(),
            amount: Cents(amount),
        }
    }

    #[test]
    fn test_record_updates_funding() {
        let mut conn = test_db();
        record(&mut conn, &investment("inv-a", "alice", 60_000), 200).expect("record");
        record(&mut conn, &investment("inv-b", "bob", 40_000), 201).expect("record");

        let product = products::get(&conn, "prod-1").expect("get").expect("exists");
        assert_eq!(product.current_funding, Cents(100_000));
        assert_eq!(list_by_product(&conn, "prod-1").expect("list").len(), 2);
    }

    #[test]
    fn test_record_unknown_product_rolls_back() {
        let mut conn = test_db();
        let mut orphan = investment("inv-x", "alice", 500);
        orphan.product_id = "nope".to_string();
        assert!(record(&mut conn, &orphan, 200).is_err());
        assert!(list_by_user(&conn, "alice").expect("list").is_empty());
    }

    #[test]
    fn test_duplicate_id_rolls_back_funding() {
        let mut conn = test_db();
        record(&mut conn, &investment("inv-a", "alice", 1000), 200).expect("record");
        assert!(record(&mut conn, &investment("inv-a", "bob", 5000), 201).is_err());

        let product = products::get(&conn, "prod-1").expect("get").expect("exists");
        assert_eq!(product.current_funding, Cents(1000));
    }

    #[test]
    fn test_list_by_user() {
        let conn = test_db();
        insert(&conn, &investment("inv-a", "alice", 1000), 200).expect("insert");
        insert(&conn, &investment("inv-b", "bob", 2000), 201).expect("insert");

        let alice = list_by_user(&conn, "alice").expect("list");
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].amount, Cents(1000));
    }
}
