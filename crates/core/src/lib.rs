//! Core business logic for DebtTracker.
//!
//! This crate holds the domain rules and the outbound service clients. It has
//! no web framework or database dependencies.
//!
//! # Modules
//!
//! - `ledger` - Debtors, entries, and the add/pay/delete rules
//! - `auth` - Password policy and hashing
//! - `admin` - Admin identity and the users-with-debtors join
//! - `notify` - Best-effort webhook notifications
//! - `assistant` - AI summaries and chat over the owner's debtors

pub mod admin;
pub mod assistant;
pub mod auth;
pub mod ledger;
pub mod notify;
