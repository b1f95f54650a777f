//! Forward-only schema migrations.
//!
//! `PRAGMA user_version` holds the number of steps applied. Step `n` (1-based)
//! is `STEPS[n - 1]`; each runs in its own transaction together with the
//! version bump, so a failed step leaves the previous version intact.

use rusqlite::Connection;

use crate::{schema, DbError, Result, SCHEMA_VERSION};

/// SQL for each schema version, oldest first.
const STEPS: &[&str] = &[schema::SCHEMA_V1];

fn user_version(conn: &Connection) -> Result<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Bring the database up to [`SCHEMA_VERSION`].
///
/// # Errors
///
/// - [`DbError::Migration`] if the file was written by a newer build
/// - [`DbError::Sqlite`] if a step fails; that step is rolled back
pub fn run(conn: &Connection) -> Result<()> {
    let current = user_version(conn)?;
    if current > SCHEMA_VERSION {
        return Err(DbError::Migration(format!(
            "database is at v{current}, this build supports up to v{SCHEMA_VERSION}"
        )));
    }

    for (index, sql) in STEPS.iter().enumerate().skip(current as usize) {
        let version = index as u32 + 1;
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        tracing::info!(version, "applied ledger schema migration");
    }
    Ok(())
}
