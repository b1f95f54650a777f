//! [`LedgerStore`] backed by SQLite.
//!
//! A batch is applied inside one SQLite transaction. Any failure drops the
//! transaction before commit, which rolls back every row it touched.

use rusqlite::Connection;
use revshare_engine::store::{LedgerBatch, LedgerStore, OrderReceipt, StoreError, StoreResult};
use revshare_types::{Investment, Product};

use crate::queries::{investments, notifications, orders, products, transactions, wallets};
use crate::{new_id, DbError};

/// A ledger over a borrowed connection.
pub struct SqliteLedger<'c> {
    conn: &'c mut Connection,
}

impl<'c> SqliteLedger<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }

    fn apply(conn: &Connection, batch: &LedgerBatch) -> crate::Result<()> {
        if let Some(receipt) = &batch.receipt {
            orders::insert(conn, receipt)?;
        }

        for credit in &batch.credits {
            wallets::ensure(conn, &credit.user_id, batch.created_at)?;
            wallets::credit(conn, &credit.user_id, credit.amount, batch.created_at)?;
            transactions::insert(
                conn,
                &new_id(),
                &credit.user_id,
                &credit.transaction,
                batch.created_at,
            )?;
            notifications::insert(
                conn,
                &new_id(),
                &credit.user_id,
                &credit.notification,
                batch.created_at,
            )?;
        }
        Ok(())
    }
}

impl LedgerStore for SqliteLedger<'_> {
    fn product(&self, product_id: &str) -> StoreResult<Option<Product>> {
        products::get(&*self.conn, product_id).map_err(StoreError::backend)
    }

    fn investments(&self, product_id: &str) -> StoreResult<Vec<Investment>> {
        investments::list_by_product(&*self.conn, product_id).map_err(StoreError::backend)
    }

    fn order_receipt(&self, order_id: &str) -> StoreResult<Option<OrderReceipt>> {
        orders::get(&*self.conn, order_id).map_err(StoreError::backend)
    }

    fn commit(&mut self, batch: &LedgerBatch) -> StoreResult<()> {
        if batch.is_empty() && batch.receipt.is_none() {
            return Ok(());
        }
        let tx = self.conn.transaction().map_err(|e| StoreError::backend(DbError::Sqlite(e)))?;

        if let Err(e) = Self::apply(&tx, batch) {
            tracing::error!(error = %e, "ledger batch failed, rolling back");
            return Err(match (&batch.receipt, &e) {
                (Some(receipt), DbError::Constraint(_)) => {
                    StoreError::DuplicateOrder(receipt.order_id.clone())
                }
                (_, DbError::AmountOverflow(_)) => StoreError::Overflow(e.to_string()),
                _ => StoreError::backend(e),
            });
        }

        tx.commit()
            .map_err(|e| StoreError::backend(DbError::Sqlite(e)))?;
        tracing::debug!(credits = batch.credits.len(), "ledger batch committed");
        Ok(())
    }
}
