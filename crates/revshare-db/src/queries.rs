//! Database query functions organized by table.

pub mod investments;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod transactions;
pub mod wallets;
