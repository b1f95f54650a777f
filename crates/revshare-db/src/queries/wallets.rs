//! Wallet query functions.

use rusqlite::{Connection, OptionalExtension};
use revshare_types::Cents;

use crate::{DbError, Result};

/// Create a zero-balance wallet if the user has none.
pub fn ensure(conn: &Connection, user_id: &str, now: u64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO wallets (user_id, balance_cents, created_at, updated_at)
         VALUES (?1, 0, ?2, ?2)",
        rusqlite::params![user_id, now as i64],
    )?;
    Ok(())
}

/// Atomically increment a wallet balance. The wallet must exist.
///
/// A credit that would take the balance past `i64::MAX` cents fails with
/// [`DbError::AmountOverflow`] and leaves the balance unchanged.
pub fn credit(conn: &Connection, user_id: &str, amount: Cents, now: u64) -> Result<()> {
    let amount = crate::sql_cents("credit", amount)?;
    let updated = conn.execute(
        "UPDATE wallets SET balance_cents = balance_cents + ?1, updated_at = ?2
         WHERE user_id = ?3 AND balance_cents <= ?4 - ?1",
        rusqlite::params![amount, now as i64, user_id, i64::MAX],
    )?;
    if updated == 0 {
        return Err(match get(conn, user_id)? {
            Some(_) => DbError::AmountOverflow(format!("balance of wallet '{user_id}'")),
            None => DbError::NotFound(format!("wallet '{user_id}'")),
        });
    }
    Ok(())
}

/// Balance of a user's wallet; zero if none exists yet.
pub fn balance(conn: &Connection, user_id: &str) -> Result<Cents> {
    Ok(get(conn, user_id)?.map(|w| w.balance).unwrap_or_default())
}

/// Point-read of a wallet.
pub fn get(conn: &Connection, user_id: &str) -> Result<Option<WalletRow>> {
    let row = conn
        .query_row(
            "SELECT user_id, balance_cents, created_at, updated_at FROM wallets WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok(WalletRow {
                    user_id: row.get(0)?,
                    balance: Cents(row.get::<_, i64>(1)? as u64),
                    created_at: row.get::<_, i64>(2)? as u64,
                    updated_at: row.get::<_, i64>(3)? as u64,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// A raw wallet row.
#[derive(Debug, Clone)]
pub struct WalletRow {
    pub user_id: String,
    pub balance: Cents,
    pub created_at: u64,
    pub updated_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_empty_balance() {
        let conn = test_db();
        assert_eq!(balance(&conn, "alice").expect("balance"), Cents::ZERO);
        assert!(get(&conn, "alice").expect("get").is_none());
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let conn = test_db();
        ensure(&conn, "alice", 100).expect("ensure");
        credit(&conn, "alice", Cents(250), 101).expect("credit");
        ensure(&conn, "alice", 102).expect("ensure again");
        assert_eq!(balance(&conn, "alice").expect("balance"), Cents(250));
    }

    #[test]
    fn test_credit_accumulates() {
        let conn = test_db();
        ensure(&conn, "alice", 100).expect("ensure");
        credit(&conn, "alice", Cents(600), 101).expect("credit");
        credit(&conn, "alice", Cents(400), 102).expect("credit");

        let wallet = get(&conn, "alice").expect("get").expect("exists");
        assert_eq!(wallet.balance, Cents(1000));
        assert_eq!(wallet.created_at, 100);
        assert_eq!(wallet.updated_at, 102);
    }

    #[test]
    fn test_credit_refuses_overflow() {
        let conn = test_db();
        ensure(&conn, "alice", 100).expect("ensure");
        credit(&conn, "alice", Cents::MAX, 101).expect("credit to max");

        let err = credit(&conn, "alice", Cents(1), 102).expect_err("past max");
        assert!(matches!(err, DbError::AmountOverflow(_)));

        let wallet = get(&conn, "alice").expect("get").expect("exists");
        assert_eq!(wallet.balance, Cents::MAX);
        assert_eq!(wallet.updated_at, 101);
    }

    #[test]
    fn test_credit_without_wallet_fails() {
        let conn = test_db();
        assert!(matches!(
            credit(&conn, "ghost", Cents(1), 100),
            Err(DbError::NotFound(_))
        ));
    }
}
