//! Distribution results returned to callers.

use serde::{Deserialize, Serialize};

use crate::Cents;

/// How a distribution call ended. Every variant is a success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DistributionOutcome {
    /// At least one investor was credited.
    Distributed,
    /// Sale did not exceed manufacturing cost.
    NoProfit,
    /// Product has no funding, or every share rounded to zero.
    NoInvestors,
    /// The order was already distributed; nothing was written.
    AlreadyProcessed,
}

impl DistributionOutcome {
    pub fn message(self) -> &'static str {
        match self {
            Self::Distributed => "Revenue distributed successfully",
            Self::NoProfit => "No profit to distribute",
            Self::NoInvestors => "No investors to distribute to",
            Self::AlreadyProcessed => "Order already distributed",
        }
    }
}

/// One investor's payout from a sale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InvestorShare {
    pub investor_id: String,
    pub investment_id: String,
    #[ts(type = "number")]
    pub amount: Cents,
    /// Ownership of the funding round in basis points.
    pub ownership_bps: u32,
    /// The same ownership as a percentage, e.g. `60.0`.
    pub percentage: f64,
}

impl InvestorShare {
    pub fn new(
        investor_id: String,
        investment_id: String,
        amount: Cents,
        ownership_bps: u32,
    ) -> Self {
        Self {
            investor_id,
            investment_id,
            amount,
            ownership_bps,
            percentage: f64::from(ownership_bps) / 100.0,
        }
    }
}

/// Summary of a single distribution call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResult {
    /// Always true; failures are errors, not results.
    pub success: bool,
    pub outcome: DistributionOutcome,
    pub message: String,
    #[ts(type = "number")]
    pub total_distributed: Cents,
    pub investor_count: u32,
    #[ts(type = "number")]
    pub total_profit: Cents,
    pub per_investor: Vec<InvestorShare>,
}

impl DistributionResult {
    pub fn new(
        outcome: DistributionOutcome,
        total_distributed: Cents,
        investor_count: u32,
        total_profit: Cents,
        per_investor: Vec<InvestorShare>,
    ) -> Self {
        Self {
            success: true,
            outcome,
            message: outcome.message().to_string(),
            total_distributed,
            investor_count,
            total_profit,
            per_investor,
        }
    }

    /// A terminal result that moves no money.
    pub fn empty(outcome: DistributionOutcome, total_profit: Cents) -> Self {
        Self::new(outcome, Cents::ZERO, 0, total_profit, Vec::new())
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A payout line in a [`DistributionResponse`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub investor_id: String,
    pub investment_id: String,
    /// Dollars.
    pub amount: f64,
    pub percentage: f64,
}

/// What `distribute_revenue` returns to callers. Amounts are dollars.
///
/// `totalProfit` is present only when a profit was distributed or replayed,
/// `distributions` only when someone was paid by this call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResponse {
    pub success: bool,
    pub message: String,
    pub outcome: DistributionOutcome,
    pub distributed_amount: f64,
    pub investor_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub total_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub distributions: Option<Vec<DistributionEntry>>,
}

impl From<&DistributionResult> for DistributionResponse {
    fn from(result: &DistributionResult) -> Self {
        let total_profit = matches!(
            result.outcome,
            DistributionOutcome::Distributed | DistributionOutcome::AlreadyProcessed
        )
        .then(|| result.total_profit.to_dollars());

        let distributions = (!result.per_investor.is_empty()).then(|| {
            result
                .per_investor
                .iter()
                .map(|share| DistributionEntry {
                    investor_id: share.investor_id.clone(),
                    investment_id: share.investment_id.clone(),
                    amount: share.amount.to_dollars(),
                    percentage: share.percentage,
                })
                .collect()
        });

        Self {
            success: result.success,
            message: result.message.clone(),
            outcome: result.outcome,
            distributed_amount: result.total_distributed.to_dollars(),
            investor_count: result.investor_count,
            total_profit,
            distributions,
        }
    }
}
