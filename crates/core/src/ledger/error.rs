//! Ledger error types.
//!
//! Expected business outcomes (unknown debtor, overpayment) are not errors;
//! they are variants of `PaymentOutcome`. Everything here is either a
//! concurrency conflict or an infrastructure failure.

use debttracker_shared::AppError;
use debttracker_shared::types::DebtorId;
use rust_decimal::Decimal;
use thiserror::Error;

use super::validation::ValidationError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input rejected before reaching the ledger.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record changed between read and write.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// A running total left the representable range.
    #[error("Amount overflow: {total} + {amount}")]
    AmountOverflow {
        /// Total before the entry.
        total: Decimal,
        /// Entry amount that overflowed it.
        amount: Decimal,
    },

    /// A persisted record whose cached total disagrees with its entries.
    #[error("Debtor {debtor_id} is inconsistent: stored total {stored}, entries sum to {computed}")]
    Inconsistent {
        /// The offending record.
        debtor_id: DebtorId,
        /// `total_debt` as stored.
        stored: Decimal,
        /// Sum of the stored entries.
        computed: Decimal,
    },

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(e) => e.into(),
            LedgerError::ConcurrentModification => Self::Conflict(err.to_string()),
            LedgerError::AmountOverflow { .. } => {
                Self::BusinessRule("Amount is too large".to_string())
            }
            LedgerError::Inconsistent { .. } => Self::Internal(err.to_string()),
            LedgerError::Storage(msg) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validation_error_is_transparent() {
        let err = LedgerError::from(ValidationError::AliasContainsWhitespace);
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::AliasContainsWhitespace)
        ));
        assert_eq!(err.to_string(), "Alias must not contain spaces");
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = LedgerError::ConcurrentModification.into();
        assert_eq!(app.status_code(), 409);

        let app: AppError = LedgerError::Storage("connection refused".into()).into();
        assert_eq!(app.status_code(), 500);
        assert!(app.is_internal());

        let app: AppError = ValidationError::NonPositiveAmount.into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.public_message(), "Amount must be greater than zero");
    }
}
