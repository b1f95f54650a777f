//! # revshare-types
//!
//! Shared domain types used across the revshare workspace.
//!
//! Everything that crosses a trust boundary (RPC payloads, stored rows) is
//! parsed into these types before any arithmetic runs. Money is always held
//! as integer [`Cents`].

pub mod catalog;
pub mod distribution;
pub mod money;
pub mod sale;

pub use catalog::{Investment, Product};
pub use distribution::{
    DistributionEntry, DistributionOutcome, DistributionResponse, DistributionResult, InvestorShare,
};
pub use money::Cents;
pub use sale::SaleEvent;

/// Percent of a sale's profit allocated to the investor pool.
pub const REVENUE_SHARE_PERCENTAGE: u64 = 25;

/// Fixed-point scale for ownership fractions (1 bp = 0.01%).
pub const BASIS_POINTS: u64 = 10_000;

/// Cents per dollar.
pub const CENTS_PER_DOLLAR: u64 = 100;

/// A rejected input at the parsing boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is absent or null.
    #[error("{0} is required")]
    Missing(&'static str),

    /// A field has the wrong JSON type.
    #[error("{field} must be {expected}")]
    WrongType {
        /// The offending field.
        field: &'static str,
        /// What was expected instead.
        expected: &'static str,
    },

    /// A field is well-typed but outside its allowed range.
    #[error("{field} {reason}")]
    OutOfRange {
        /// The offending field.
        field: &'static str,
        /// Human readable constraint.
        reason: &'static str,
    },
}

/// Convenience result type for boundary parsing.
pub type Result<T> = std::result::Result<T, ValidationError>;
