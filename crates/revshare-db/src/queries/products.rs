//! Product query functions.

use rusqlite::{Connection, OptionalExtension};
use revshare_types::{Cents, Product};

use crate::{DbError, Result};

/// Insert a product with zero funding.
pub fn insert(conn: &Connection, id: &str, name: &str, created_at: u64) -> Result<()> {
    conn.execute(
        "INSERT INTO products (id, name, current_funding_cents, created_at)
         VALUES (?1, ?2, 0, ?3)",
        rusqlite::params![id, name, created_at as i64],
    )?;
    Ok(())
}

/// Point-read of a product.
pub fn get(conn: &Connection, id: &str) -> Result<Option<Product>> {
    let product = conn
        .query_row(
            "SELECT id, name, current_funding_cents FROM products WHERE id = ?1",
            [id],
            |row| {
                Ok(Product {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    current_funding: Cents(row.get::<_, i64>(2)? as u64),
                })
            },
        )
        .optional()?;
    Ok(product)
}

/// Increase a product's funding total.
///
/// # Errors
///
/// - [`DbError::NotFound`] if the product does not exist
/// - [`DbError::AmountOverflow`] if the total would exceed `i64::MAX` cents;
///   the row is left unchanged
pub fn add_funding(conn: &Connection, id: &str, amount: Cents) -> Result<()> {
    let amount = crate::sql_cents("funding", amount)?;
    let updated = conn.execute(
        "UPDATE products SET current_funding_cents = current_funding_cents + ?1
         WHERE id = ?2 AND current_funding_cents <= ?3 - ?1",
        rusqlite::params![amount, id, i64::MAX],
    )?;
    if updated == 0 {
        return Err(match get(conn, id)? {
            Some(_) => DbError::AmountOverflow(format!("funding of product '{id}'")),
            None => DbError::NotFound(format!("product '{id}'")),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_insert_and_get() {
        let conn = test_db();
        insert(&conn, "prod-1", "Desk Lamp", 100).expect("insert");

        let product = get(&conn, "prod-1").expect("get").expect("exists");
        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.current_funding, Cents::ZERO);
    }

    #[test]
    fn test_get_missing() {
        let conn = test_db();
        assert!(get(&conn, "nope").expect("get").is_none());
    }

    #[test]
    fn test_duplicate_insert_is_constraint_violation() {
        let conn = test_db();
        insert(&conn, "prod-1", "Desk Lamp", 100).expect("insert");
        let err = insert(&conn, "prod-1", "Other", 200).expect_err("duplicate");
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_add_funding() {
        let conn = test_db();
        insert(&conn, "prod-1", "Desk Lamp", 100).expect("insert");
        add_funding(&conn, "prod-1", Cents(60_000)).expect("fund");
        add_funding(&conn, "prod-1", Cents(40_000)).expect("fund");

        let product = get(&conn, "prod-1").expect("get").expect("exists");
        assert_eq!(product.current_funding, Cents(100_000));
    }

    #[test]
    fn test_add_funding_refuses_overflow() {
        let conn = test_db();
        insert(&conn, "prod-1", "Desk Lamp", 100).expect("insert");
        add_funding(&conn, "prod-1", Cents(6_000_000_000_000_000_000)).expect("fund");

        let err = add_funding(&conn, "prod-1", Cents(6_000_000_000_000_000_000))
            .expect_err("sum exceeds i64");
        assert!(matches!(err, DbError::AmountOverflow(_)));

        // Row is still a readable integer with the first amount.
        let product = get(&conn, "prod-1").expect("get").expect("exists");
        assert_eq!(product.current_funding, Cents(6_000_000_000_000_000_000));

        let remaining = Cents::MAX.get() - 6_000_000_000_000_000_000;
        add_funding(&conn, "prod-1", Cents(remaining)).expect("fill to max");
        let product = get(&conn, "prod-1").expect("get").expect("exists");
        assert_eq!(product.current_funding, Cents::MAX);
    }

    #[test]
    fn test_add_funding_rejects_unstorable_amount() {
        let conn = test_db();
        insert(&conn, "prod-1", "Desk Lamp", 100).expect("insert");
        assert!(matches!(
            add_funding(&conn, "prod-1", Cents(u64::MAX)),
            Err(DbError::AmountOverflow(_))
        ));
        assert_eq!(
            get(&conn, "prod-1").expect("get").expect("exists").current_funding,
            Cents::ZERO
        );
    }

    #[test]
    fn test_add_funding_missing_product() {
        let conn = test_db();
        assert!(matches!(
            add_funding(&conn, "nope", Cents(1)),
            Err(DbError::NotFound(_))
        ));
    }
}
