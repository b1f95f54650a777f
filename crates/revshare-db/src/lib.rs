//! # revshare-db
//!
//! SQLite ledger behind the revenue distributor: products and their
//! investments, investor wallets, append-only transaction and notification
//! records, and receipts for orders already paid.
//!
//! Amounts are integer cents and timestamps Unix seconds. Every connection
//! runs in WAL mode with foreign keys on, and is migrated before it is
//! handed out.

pub mod ledger;
pub mod migrations;
pub mod queries;
pub mod schema;

pub use ledger::SqliteLedger;

use std::path::Path;

use revshare_types::Cents;
use rusqlite::{Connection, ErrorCode};

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const PRAGMAS: &str = "PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("schema migration: {0}")]
    Migration(String),

    #[error("{0} does not exist")]
    NotFound(String),

    #[error("{0}")]
    Constraint(String),

    /// An amount or running total would not fit in an INTEGER column.
    #[error("{0} exceeds the maximum storable amount")]
    AmountOverflow(String),

    /// A JSON column could not be encoded or decoded.
    #[error("json column: {0}")]
    Serialization(String),
}

impl DbError {
    /// Primary key, unique, check or foreign key violation.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            DbError::Constraint(_) => true,
            DbError::Sqlite(rusqlite::Error::SqliteFailure(failure, _)) => {
                failure.code == ErrorCode::ConstraintViolation
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// An amount as an SQLite INTEGER.
pub(crate) fn sql_cents(what: &str, amount: Cents) -> Result<i64> {
    i64::try_from(amount.get()).map_err(|_| DbError::AmountOverflow(what.to_string()))
}

/// Open (creating if needed) the ledger file at `path`.
pub fn open(path: &Path) -> Result<Connection> {
    prepare(Connection::open(path)?)
}

/// A private in-memory ledger, used by tests.
pub fn open_memory() -> Result<Connection> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection> {
    conn.execute_batch(PRAGMAS)?;
    migrations::run(&conn)?;
    Ok(conn)
}

/// 32 hex characters of randomness, used as a row id.
pub fn new_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}
