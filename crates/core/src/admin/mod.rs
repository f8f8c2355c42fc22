//! Admin dashboard logic.
//!
//! One configured email is the administrator. The dashboard joins user
//! accounts with the debtors they own.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use debttracker_shared::types::{DebtorId, UserId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::ledger::{Debtor, LedgerError, LedgerSummary};

/// Returns true if `email` is the configured admin email, ignoring case and
/// surrounding whitespace. Nobody is admin when none is configured.
#[must_use]
pub fn is_admin(admin_email: Option<&str>, email: &str) -> bool {
    admin_email
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .is_some_and(|a| a.eq_ignore_ascii_case(email.trim()))
}

/// A user account as seen by the admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// User id.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// One debtor line in a user overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtorDigest {
    /// Debtor id.
    pub id: DebtorId,
    /// Alias.
    pub alias: String,
    /// Outstanding balance.
    pub total_debt: Decimal,
    /// Number of entries in the history.
    pub entries: usize,
}

/// A user with the debtors they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOverview {
    /// User id.
    pub id: UserId,
    /// Login email.
    pub email: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Number of debtors the user has.
    pub debtors_count: usize,
    /// Sum of their debtors' balances.
    pub total_debt_amount: Decimal,
    /// The debtors, largest balance first.
    pub debtors: Vec<DebtorDigest>,
}

/// Platform-wide totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    /// Registered users.
    pub total_users: u64,
    /// Open debtor records across all users.
    pub total_debtors: u64,
    /// Sum of all balances.
    pub total_debt_amount: Decimal,
}

/// Joins accounts with debtors, newest account first.
///
/// Debtors whose owner is not among `accounts` are ignored.
///
/// # Errors
///
/// Returns `LedgerError::AmountOverflow` if an account's total is not
/// representable.
pub fn build_overviews(
    accounts: Vec<Account>,
    debtors: Vec<Debtor>,
) -> Result<Vec<UserOverview>, LedgerError> {
    let mut by_owner: HashMap<UserId, Vec<Debtor>> = HashMap::new();
    for debtor in debtors {
        by_owner.entry(debtor.owner_id()).or_default().push(debtor);
    }

    let mut overviews: Vec<UserOverview> = accounts
        .into_iter()
        .map(|account| -> Result<UserOverview, LedgerError> {
            let mut owned = by_owner.remove(&account.id).unwrap_or_default();
            owned.sort_by(|a, b| b.total_debt().cmp(&a.total_debt()));

            let summary = LedgerSummary::from_debtors(&owned)?;

            Ok(UserOverview {
                id: account.id,
                email: account.email,
                created_at: account.created_at,
                debtors_count: summary.debtor_count,
                total_debt_amount: summary.total_outstanding,
                debtors: owned
                    .iter()
                    .map(|d| DebtorDigest {
                        id: d.id(),
                        alias: d.alias().to_string(),
                        total_debt: d.total_debt(),
                        entries: d.debts().len(),
                    })
                    .collect(),
            })
        })
        .collect::<Result<_, _>>()?;

    overviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(overviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DebtorAlias, OwnerContext, PositiveAmount};
    use chrono::{Duration, TimeZone};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(Some("admin@example.com"), "admin@example.com", true)]
    #[case(Some("Admin@Example.com"), "  admin@example.COM ", true)]
    #[case(Some("admin@example.com"), "someone@example.com", false)]
    #[case(Some(""), "", false)]
    #[case(None, "admin@example.com", false)]
    fn test_is_admin(#[case] configured: Option<&str>, #[case] email: &str, #[case] expected: bool) {
        assert_eq!(is_admin(configured, email), expected);
    }

    fn account(email: &str, days_ago: i64) -> Account {
        Account {
            id: UserId::new(),
            email: email.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap() - Duration::days(days_ago),
        }
    }

    fn debtor(owner: &Account, alias: &str, amount: Decimal) -> Debtor {
        Debtor::open(
            &OwnerContext::new(owner.id),
            DebtorAlias::parse(alias).unwrap(),
            PositiveAmount::new(amount).unwrap(),
            Utc::now(),
        )
    }

    #[test]
    fn test_build_overviews_joins_and_sorts() {
        let old = account("old@example.com", 30);
        let new = account("new@example.com", 1);
        let stranger = account("gone@example.com", 5);
        let debtors = vec![
            debtor(&old, "Ana", dec!(10)),
            debtor(&old, "Bob", dec!(90.5)),
            debtor(&stranger, "Zed", dec!(1)),
        ];

        let overviews = build_overviews(vec![old.clone(), new.clone()], debtors).unwrap();

        assert_eq!(overviews.len(), 2);
        assert_eq!(overviews[0].email, "new@example.com");
        assert_eq!(overviews[0].debtors_count, 0);
        assert_eq!(overviews[0].total_debt_amount, Decimal::ZERO);

        assert_eq!(overviews[1].id, old.id);
        assert_eq!(overviews[1].debtors_count, 2);
        assert_eq!(overviews[1].total_debt_amount, dec!(100.5));
        assert_eq!(overviews[1].debtors[0].alias, "Bob");
        assert_eq!(overviews[1].debtors[0].entries, 1);
    }

    #[test]
    fn test_build_overviews_reports_overflow() {
        let owner = account("big@example.com", 2);
        let debtors = vec![
            debtor(&owner, "Ana", Decimal::MAX),
            debtor(&owner, "Bob", dec!(1)),
        ];

        let err = build_overviews(vec![owner], debtors).unwrap_err();

        assert!(matches!(err, LedgerError::AmountOverflow { .. }));
    }
}
