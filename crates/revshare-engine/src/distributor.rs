//! Distribute one sale against a ledger store.

use revshare_types::{DistributionResult, SaleEvent};

use crate::apportion;
use crate::store::{LedgerBatch, LedgerStore, StoreError};
use crate::{Result, RevenueError};

/// Per-call distribution behaviour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributorOptions {
    /// Refuse to pay the same `order_id` twice.
    pub dedupe_orders: bool,
}

impl Default for DistributorOptions {
    fn default() -> Self {
        Self {
            dedupe_orders: true,
        }
    }
}

/// Distribute the investor share of `sale`.
///
/// Reads the product and its investments, computes the apportionment, and
/// commits every wallet credit, transaction and notification as one batch.
/// Nothing is written for terminal outcomes (no profit, no investors,
/// already processed).
///
/// # Errors
///
/// - [`RevenueError::InvalidArgument`] if the sale fails validation
/// - [`RevenueError::ProductNotFound`] if the product does not exist
/// - [`RevenueError::Store`] if a read or the commit fails; no mutation is applied
pub fn distribute_sale<S>(
    store: &mut S,
    sale: &SaleEvent,
    options: &DistributorOptions,
    now: u64,
) -> Result<DistributionResult>
where
    S: LedgerStore + ?Sized,
{
    sale.validate()?;

    if options.dedupe_orders {
        if let Some(receipt) = store.order_receipt(&sale.order_id)? {
            tracing::info!(order = %sale.order_id, "order already distributed, skipping");
            return Ok(receipt.replay());
        }
    }

    let product = store
        .product(&sale.product_id)?
        .ok_or_else(|| RevenueError::ProductNotFound(sale.product_id.clone()))?;
    let investments = store.investments(&product.id)?;

    let result = apportion::compute(sale, &product, &investments)?;
    if result.per_investor.is_empty() {
        tracing::info!(
            product = %product.id,
            order = %sale.order_id,
            outcome = ?result.outcome,
            "nothing to distribute"
        );
        return Ok(result);
    }

    let batch = LedgerBatch::for_distribution(
        sale,
        &product,
        &investments,
        &result,
        options.dedupe_orders,
        now,
    );

    match store.commit(&batch) {
        Ok(()) => {}
        Err(StoreError::DuplicateOrder(order_id)) => {
            tracing::warn!(order = %order_id, "order distributed concurrently, batch discarded");
            return match store.order_receipt(&order_id)? {
                Some(receipt) => Ok(receipt.replay()),
                None => Err(StoreError::DuplicateOrder(order_id).into()),
            };
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        product = %product.id,
        order = %sale.order_id,
        profit = %result.total_profit,
        distributed = %result.total_distributed,
        investors = result.investor_count,
        "revenue distributed"
    );

    Ok(result)
}
