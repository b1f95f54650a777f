//! The ledger store seam.
//!
//! The distributor never talks to a database directly. It reads through
//! [`LedgerStore`] and hands every mutation of one sale to a single
//! [`LedgerStore::commit`] call, which must apply all of it or none of it.

use std::collections::HashMap;

use revshare_types::{
    Cents, DistributionOutcome, DistributionResult, Investment, Product, SaleEvent,
    REVENUE_SHARE_PERCENTAGE,
};
use serde::{Deserialize, Serialize};

/// Transaction and notification kind for revenue payouts.
pub const REVENUE_SHARE_KIND: &str = "revenue_share";

/// Status recorded on every payout transaction.
pub const STATUS_COMPLETED: &str = "completed";

/// Errors surfaced by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The order already has a receipt; the batch was not applied.
    #[error("order {0} was already distributed")]
    DuplicateOrder(String),

    /// A balance or total would exceed what the store can hold. Nothing was applied.
    #[error("{0}")]
    Overflow(String),

    /// Any backend failure. Nothing from the failed call was applied.
    #[error("{0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read access to products and investments plus atomic batch commit.
pub trait LedgerStore {
    /// Point-read of a product.
    fn product(&self, product_id: &str) -> StoreResult<Option<Product>>;

    /// Every investment recorded against a product.
    fn investments(&self, product_id: &str) -> StoreResult<Vec<Investment>>;

    /// The receipt of an already distributed order, if any.
    fn order_receipt(&self, order_id: &str) -> StoreResult<Option<OrderReceipt>>;

    /// Apply every mutation in `batch`, or none of them.
    fn commit(&mut self, batch: &LedgerBatch) -> StoreResult<()>;
}

/// Marks an order as distributed, keyed on `order_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub product_id: String,
    pub total_distributed: Cents,
    pub investor_count: u32,
    pub total_profit: Cents,
    pub processed_at: u64,
}

impl OrderReceipt {
    /// The result reported when this order is seen again.
    pub fn replay(&self) -> DistributionResult {
        DistributionResult::new(
            DistributionOutcome::AlreadyProcessed,
            self.total_distributed,
            self.investor_count,
            self.total_profit,
            Vec::new(),
        )
    }
}

/// Immutable payout record for one investor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub kind: String,
    pub amount: Cents,
    pub product_id: String,
    pub order_id: String,
    pub investment_id: String,
    /// `investment / funding`, display only.
    pub investment_percentage: f64,
    pub ownership_bps: u32,
    pub sale_amount: Cents,
    pub profit: Cents,
    pub revenue_share_percentage: u64,
    pub status: String,
}

/// Notification delivered to an investor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub kind: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}

/// Everything written for one credited investor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvestorCredit {
    pub user_id: String,
    /// Wallet increment. The wallet is created at zero if missing.
    pub amount: Cents,
    pub transaction: TransactionEntry,
    pub notification: NotificationEntry,
}

/// All mutations of one distribution call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerBatch {
    pub credits: Vec<InvestorCredit>,
    pub receipt: Option<OrderReceipt>,
    pub created_at: u64,
}

impl LedgerBatch {
    /// Build the batch for a computed distribution.
    pub fn for_distribution(
        sale: &SaleEvent,
        product: &Product,
        investments: &[Investment],
        result: &DistributionResult,
        record_receipt: bool,
        created_at: u64,
    ) -> Self {
        let by_id: HashMap<&str, &Investment> =
            investments.iter().map(|i| (i.id.as_str(), i)).collect();

        let credits = result
            .per_investor
            .iter()
            .map(|share| {
                let investment_percentage = by_id
                    .get(share.investment_id.as_str())
                    .map(|i| i.amount.get() as f64 / product.current_funding.get() as f64)
                    .unwrap_or_else(|| f64::from(share.ownership_bps) / 10_000.0);

                InvestorCredit {
                    user_id: share.investor_id.clone(),
                    amount: share.amount,
                    transaction: TransactionEntry {
                        kind: REVENUE_SHARE_KIND.to_string(),
                        amount: share.amount,
                        product_id: product.id.clone(),
                        order_id: sale.order_id.clone(),
                        investment_id: share.investment_id.clone(),
                        investment_percentage,
                        ownership_bps: share.ownership_bps,
                        sale_amount: sale.sale_amount,
                        profit: result.total_profit,
                        revenue_share_percentage: REVENUE_SHARE_PERCENTAGE,
                        status: STATUS_COMPLETED.to_string(),
                    },
                    notification: NotificationEntry {
                        kind: REVENUE_SHARE_KIND.to_string(),
                        title: "Revenue share received".to_string(),
                        message: format!(
                            "You earned ${} from a sale of {}",
                            share.amount, product.name
                        ),
                        data: serde_json::json!({
                            "productId": product.id,
                            "orderId": sale.order_id,
                            "investmentId": share.investment_id,
                            "amount": share.amount.to_dollars(),
                        }),
                    },
                }
            })
            .collect();

        let receipt = record_receipt.then(|| OrderReceipt {
            order_id: sale.order_id.clone(),
            product_id: product.id.clone(),
            total_distributed: result.total_distributed,
            investor_count: result.investor_count,
            total_profit: result.total_profit,
            processed_at: created_at,
        });

        Self {
            credits,
            receipt,
            created_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.credits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revshare_types::InvestorShare;

    #[test]
    fn test_batch_carries_transaction_fields() {
        let sale = SaleEvent {
            product_id: "prod-1".to_string(),
            sale_amount: Cents(10_000),
            manufacturing_cost_per_unit: Cents(5000),
            quantity: 1,
            order_id: "order-9".to_string(),
        };
        let product = Product {
            id: "prod-1".to_string(),
            name: "Chair".to_string(),
            current_funding: Cents(80_000),
        };
        let investments = vec![Investment {
            id: "inv-a".to_string(),
            product_id: "prod-1".to_string(),
            user_id: "alice".to_string(),
            amount: Cents(20_000),
        }];
        let result = DistributionResult::new(
            DistributionOutcome::Distributed,
            Cents(312),
            1,
            Cents(5000),
            vec![InvestorShare::new("alice".into(), "inv-a".into(), Cents(312), 2500)],
        );

        let batch =
            LedgerBatch::for_distribution(&sale, &product, &investments, &result, true, 1_700_000_000);
        assert_eq!(batch.credits.len(), 1);

        let credit = &batch.credits[0];
        assert_eq!(credit.user_id, "alice");
        assert_eq!(credit.amount, Cents(312));
        assert_eq!(credit.transaction.investment_percentage, 0.25);
        assert_eq!(credit.transaction.revenue_share_percentage, 25);
        assert_eq!(credit.transaction.status, "completed");
        assert_eq!(credit.transaction.order_id, "order-9");
        assert!(credit.notification.message.contains("$3.12"));
        assert!(credit.notification.message.contains("Chair"));

        let receipt = batch.receipt.as_ref().expect("receipt");
        assert_eq!(receipt.total_distributed, Cents(312));
        assert_eq!(receipt.processed_at, 1_700_000_000);
    }

    #[test]
    fn test_receipt_replay() {
        let receipt = OrderReceipt {
            order_id: "order-1".to_string(),
            product_id: "prod-1".to_string(),
            total_distributed: Cents(1000),
            investor_count: 2,
            total_profit: Cents(4000),
            processed_at: 1,
        };
        let result = receipt.replay();
        assert_eq!(result.outcome, DistributionOutcome::AlreadyProcessed);
        assert_eq!(result.total_distributed, Cents(1000));
        assert!(result.per_investor.is_empty());
    }
}
