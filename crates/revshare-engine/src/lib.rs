//! # revshare-engine
//!
//! Revenue distribution for funded products.
//!
//! A fixed 25% of each sale's profit goes to the product's investors,
//! apportioned by ownership in basis points using integer cent arithmetic.
//! Per-investor shares are floored, so the sum paid never exceeds the pool.
//!
//! ## Modules
//!
//! - [`apportion`] - Pure profit, pool and share arithmetic
//! - [`store`] - The ledger store seam and the atomic mutation batch
//! - [`distributor`] - Load, compute and commit one sale

pub mod apportion;
pub mod distributor;
pub mod store;

use revshare_types::ValidationError;

use crate::store::StoreError;

/// Error types for revenue operations.
#[derive(Debug, thiserror::Error)]
pub enum RevenueError {
    /// Malformed or out-of-range sale input.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// Arithmetic overflow. Only reachable with absurd input amounts.
    #[error("arithmetic overflow in revenue calculation")]
    Overflow,

    /// The sale references a product the store does not have.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// The ledger store failed to read or commit.
    #[error("ledger store error: {0}")]
    Store(#[from] StoreError),
}

/// Caller-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid-argument",
            Self::NotFound => "not-found",
            Self::Internal => "internal",
        }
    }
}

impl RevenueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::Overflow => ErrorKind::InvalidArgument,
            Self::Store(StoreError::Overflow(_)) => ErrorKind::InvalidArgument,
            Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience result type for revenue operations.
pub type Result<T> = std::result::Result<T, RevenueError>;
