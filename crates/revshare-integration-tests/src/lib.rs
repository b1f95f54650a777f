//! Integration test crate for revenue distribution.
//!
//! This crate has no library code. Its tests drive sales through the
//! distributor into a real SQLite ledger and check wallets, transaction
//! records, notifications and order receipts afterwards.
//!
//! ```sh
//! cargo test -p revshare-integration-tests
//! ```
