//! Input validation for ledger operations.
//!
//! Aliases and amounts are parsed into newtypes before a ledger operation is
//! invoked, so the ledger itself never sees malformed input.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum alias length, in characters.
pub const MAX_ALIAS_LEN: usize = 50;

/// Validation errors for ledger input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Alias is empty after trimming.
    #[error("Alias is required")]
    EmptyAlias,

    /// Alias is longer than [`MAX_ALIAS_LEN`] characters.
    #[error("Alias must be at most {max} characters")]
    AliasTooLong {
        /// The limit that was exceeded.
        max: usize,
    },

    /// Alias contains whitespace between its characters.
    #[error("Alias must not contain spaces")]
    AliasContainsWhitespace,

    /// Amount is zero or negative.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
}

/// A debtor alias as the user typed it, trimmed.
///
/// Two aliases refer to the same debtor when their [`key`](Self::key)s match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DebtorAlias(String);

impl DebtorAlias {
    /// Parses an alias, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the alias is empty, too long, or
    /// contains whitespace.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::EmptyAlias);
        }
        if trimmed.chars().count() > MAX_ALIAS_LEN {
            return Err(ValidationError::AliasTooLong { max: MAX_ALIAS_LEN });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::AliasContainsWhitespace);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The alias as displayed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive matching key.
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Returns true if both aliases name the same debtor.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for DebtorAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DebtorAlias {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DebtorAlias> for String {
    fn from(alias: DebtorAlias) -> Self {
        alias.0
    }
}

/// A strictly positive amount of money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct PositiveAmount(Decimal);

impl PositiveAmount {
    /// Wraps `amount` if it is greater than zero.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NonPositiveAmount` for zero or negative amounts.
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        if amount > Decimal::ZERO {
            Ok(Self(amount))
        } else {
            Err(ValidationError::NonPositiveAmount)
        }
    }

    /// The wrapped amount.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for PositiveAmount {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PositiveAmount> for Decimal {
    fn from(amount: PositiveAmount) -> Self {
        amount.0
    }
}

impl fmt::Display for PositiveAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
