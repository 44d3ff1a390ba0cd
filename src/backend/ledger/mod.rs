//! Ledger Module
//!
//! The monetization ledger: donations to post authors, creator balances,
//! supporter rankings and withdrawals.
//!
//! # Balance
//!
//! `available = received - withdrawn`, where rejected withdrawals do not
//! count. Withdrawals check and debit the balance in a single transaction.

pub mod db;
pub mod handlers;

pub use handlers::*;
