//! Profit, pool and per-investor share arithmetic.
//!
//! All amounts are [`Cents`]. Intermediate products are widened to `u128`
//! and every division floors, so rounding only ever leaves money in the
//! pool, never takes more than it holds.
//!
//! ```text
//! profit = max(0, sale - unit_cost * quantity)
//! pool   = floor(profit * 25 / 100)
//! bps    = floor(investment * 10000 / funding)
//! share  = floor(pool * bps / 10000)
//! ```

use revshare_types::{
    Cents, DistributionOutcome, DistributionResult, Investment, InvestorShare, Product,
    SaleEvent, BASIS_POINTS, REVENUE_SHARE_PERCENTAGE,
};

use crate::{Result, RevenueError};

/// Sale revenue minus total manufacturing cost, floored at zero.
///
/// # Errors
///
/// - [`RevenueError::Overflow`] if `unit_cost * quantity` overflows
pub fn profit(sale: &SaleEvent) -> Result<Cents> {
    let total_cost = sale
        .manufacturing_cost_per_unit
        .checked_mul(sale.quantity)
        .ok_or(RevenueError::Overflow)?;
    Ok(sale.sale_amount.saturating_sub(total_cost))
}

/// The investor pool's cut of a profit.
pub fn revenue_pool(profit: Cents) -> Result<Cents> {
    let pool = u128::from(profit.get()) * u128::from(REVENUE_SHARE_PERCENTAGE) / 100;
    u64::try_from(pool)
        .map(Cents)
        .map_err(|_| RevenueError::Overflow)
}

/// Ownership of a funding round in basis points. Zero funding owns nothing.
pub fn ownership_bps(amount: Cents, funding: Cents) -> Result<u32> {
    if funding.is_zero() {
        return Ok(0);
    }
    let bps = u128::from(amount.get()) * u128::from(BASIS_POINTS) / u128::from(funding.get());
    u32::try_from(bps).map_err(|_| RevenueError::Overflow)
}

/// A holder's share of the pool.
pub fn share_of_pool(pool: Cents, bps: u32) -> Result<Cents> {
    let share = u128::from(pool.get()) * u128::from(bps) / u128::from(BASIS_POINTS);
    u64::try_from(share)
        .map(Cents)
        .map_err(|_| RevenueError::Overflow)
}

/// Compute the full distribution of one sale. No side effects.
///
/// Investments with a zero amount, an empty `user_id`, or belonging to
/// another product are skipped, as are shares that floor to zero cents.
///
/// # Errors
///
/// - [`RevenueError::InvalidArgument`] if the sale fails validation
/// - [`RevenueError::Overflow`] on absurd amounts
pub fn compute(
    sale: &SaleEvent,
    product: &Product,
    investments: &[Investment],
) -> Result<DistributionResult> {
    sale.validate()?;

    let profit = profit(sale)?;
    if profit.is_zero() {
        return Ok(DistributionResult::empty(
            DistributionOutcome::NoProfit,
            Cents::ZERO,
        ));
    }

    if product.current_funding.is_zero() {
        return Ok(DistributionResult::empty(
            DistributionOutcome::NoInvestors,
            profit,
        ));
    }

    if let Some(invested) = funding_mismatch(product, investments) {
        tracing::warn!(
            product = %product.id,
            funding = %product.current_funding,
            invested = %invested,
            "product funding does not match sum of investments"
        );
    }

    let pool = revenue_pool(profit)?;
    let mut remaining = pool;
    let mut total = Cents::ZERO;
    let mut per_investor = Vec::new();

    for investment in investments {
        if !investment.is_eligible() {
            tracing::debug!(investment = %investment.id, "skipping ineligible investment");
            continue;
        }
        if investment.product_id != product.id {
            tracing::warn!(
                investment = %investment.id,
                product = %product.id,
                "investment belongs to another product"
            );
            continue;
        }

        let bps = ownership_bps(investment.amount, product.current_funding)?;
        let mut amount = share_of_pool(pool, bps)?;
        if amount.is_zero() {
            continue;
        }
        if amount > remaining {
            tracing::warn!(
                investment = %investment.id,
                wanted = %amount,
                remaining = %remaining,
                "share exceeds remaining pool, clamping"
            );
            amount = remaining;
            if amount.is_zero() {
                continue;
            }
        }

        remaining = remaining.saturating_sub(amount);
        total = total.checked_add(amount).ok_or(RevenueError::Overflow)?;
        per_investor.push(InvestorShare::new(
            investment.user_id.clone(),
            investment.id.clone(),
            amount,
            bps,
        ));
    }

    if per_investor.is_empty() {
        return Ok(DistributionResult::empty(
            DistributionOutcome::NoInvestors,
            profit,
        ));
    }

    let investor_count = u32::try_from(per_investor.len()).map_err(|_| RevenueError::Overflow)?;
    Ok(DistributionResult::new(
        DistributionOutcome::Distributed,
        total,
        investor_count,
        profit,
        per_investor,
    ))
}

/// The sum of this product's eligible investments, when it differs from the
/// recorded funding total. The difference is logged, not enforced.
fn funding_mismatch(product: &Product, investments: &[Investment]) -> Option<u128> {
    let invested: u128 = investments
        .iter()
        .filter(|i| i.is_eligible() && i.product_id == product.id)
        .map(|i| u128::from(i.amount.get()))
        .sum();
    (invested != u128::from(product.current_funding.get())).then_some(invested)
}
