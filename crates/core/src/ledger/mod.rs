//! Debt ledger.
//!
//! Per owner, a set of named debtors, each with an append-only list of signed
//! entries and a cached running total:
//! - Input newtypes (`DebtorAlias`, `PositiveAmount`)
//! - Domain types and typed operation outcomes
//! - The `LedgerStore` capability and an in-memory implementation
//! - `DebtLedger`, which applies the add/pay/delete rules
//! - Listing helpers (filter, sort, summary, history insights)

pub mod error;
pub mod query;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use query::{DebtorInsights, DebtorQuery, LedgerSummary, SortOrder, newest_first};
pub use service::DebtLedger;
pub use store::{InMemoryLedgerStore, LedgerStore};
pub use types::{AddDebtOutcome, DebtEntry, Debtor, OwnerContext, PaymentOutcome};
pub use validation::{DebtorAlias, MAX_ALIAS_LEN, PositiveAmount, ValidationError};
