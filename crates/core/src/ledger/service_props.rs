//! Property-based tests for `DebtLedger`.
//!
//! - Running total equals the sum of entries after any add/pay sequence
//! - Alias matching ignores case
//! - Refused payments leave state unchanged

use debttracker_shared::types::UserId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::DebtLedger;
use super::store::InMemoryLedgerStore;
use super::types::{OwnerContext, PaymentOutcome, sum_entries};
use super::validation::{DebtorAlias, PositiveAmount};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A ledger operation against a single alias.
#[derive(Debug, Clone)]
enum Op {
    Add(Decimal),
    Pay(Decimal),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        positive_amount().prop_map(Op::Add),
        positive_amount().prop_map(Op::Pay),
    ]
}

/// Flips the case of every other letter.
fn mixed_case(alias: &str) -> String {
    alias
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i % 2 == 0 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Adding amounts a1..an under one alias yields one debtor whose total is
    /// their sum and whose history has n entries.
    #[test]
    fn prop_adds_accumulate(amounts in prop::collection::vec(positive_amount(), 1..20)) {
        let rt = runtime();
        let ledger = DebtLedger::new(InMemoryLedgerStore::new());
        let owner = OwnerContext::new(UserId::new());
        let alias = DebtorAlias::parse("ana").unwrap();

        let debtor = rt.block_on(async {
            for a in &amounts {
                ledger
                    .add_debt(&owner, &alias, PositiveAmount::new(*a).unwrap())
                    .await
                    .unwrap();
            }
            ledger.get_debtor(&owner, &alias).await.unwrap().unwrap()
        });

        let expected: Decimal = amounts.iter().copied().sum();
        prop_assert_eq!(debtor.total_debt(), expected);
        prop_assert_eq!(debtor.debts().len(), amounts.len());
    }

    /// Case variants of an alias always reach the same debtor.
    #[test]
    fn prop_alias_case_insensitive(
        name in "[a-z]{1,20}",
        first in positive_amount(),
        second in positive_amount(),
    ) {
        let rt = runtime();
        let ledger = DebtLedger::new(InMemoryLedgerStore::new());
        let owner = OwnerContext::new(UserId::new());
        let lower = DebtorAlias::parse(&name).unwrap();
        let mixed = DebtorAlias::parse(&mixed_case(&name)).unwrap();

        let debtors = rt.block_on(async {
            ledger.add_debt(&owner, &lower, PositiveAmount::new(first).unwrap()).await.unwrap();
            ledger.add_debt(&owner, &mixed, PositiveAmount::new(second).unwrap()).await.unwrap();
            ledger.list_debtors(&owner).await.unwrap()
        });

        prop_assert_eq!(debtors.len(), 1);
        prop_assert_eq!(debtors[0].total_debt(), first + second);
    }

    /// After any mix of adds and payments, a surviving debtor's cached total
    /// equals the sum of its entries and is positive; refused payments change
    /// nothing; a settled debtor is gone.
    #[test]
    fn prop_total_matches_entries(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let rt = runtime();
        let ledger = DebtLedger::new(InMemoryLedgerStore::new());
        let owner = OwnerContext::new(UserId::new());
        let alias = DebtorAlias::parse("Luis").unwrap();

        rt.block_on(async {
            for op in ops {
                let before = ledger.get_debtor(&owner, &alias).await.unwrap();
                match op {
                    Op::Add(a) => {
                        ledger.add_debt(&owner, &alias, PositiveAmount::new(a).unwrap()).await.unwrap();
                    }
                    Op::Pay(a) => {
                        let outcome = ledger
                            .pay_debt(&owner, &alias, PositiveAmount::new(a).unwrap())
                            .await
                            .unwrap();
                        let after = ledger.get_debtor(&owner, &alias).await.unwrap();
                        match outcome {
                            PaymentOutcome::DebtorNotFound => {
                                assert!(before.is_none());
                                assert!(after.is_none());
                            }
                            PaymentOutcome::ExceedsDebt { total_debt } => {
                                let before = before.unwrap();
                                assert!(a > total_debt);
                                assert_eq!(after.as_ref(), Some(&before));
                            }
                            PaymentOutcome::Settled { .. } => {
                                assert_eq!(before.unwrap().total_debt(), a);
                                assert!(after.is_none());
                            }
                            PaymentOutcome::Recorded(ref debtor) => {
                                assert_eq!(debtor.total_debt(), before.unwrap().total_debt() - a);
                                assert_eq!(debtor.debts().last().map(|e| e.amount), Some(-a));
                            }
                        }
                    }
                }

                if let Some(debtor) = ledger.get_debtor(&owner, &alias).await.unwrap() {
                    assert_eq!(sum_entries(debtor.debts()), Some(debtor.total_debt()));
                    assert!(debtor.total_debt() > Decimal::ZERO);
                }
            }
        });
    }

    /// Explicit deletion removes a debtor whatever it still owes.
    #[test]
    fn prop_delete_ignores_balance(amount in positive_amount()) {
        let rt = runtime();
        let ledger = DebtLedger::new(InMemoryLedgerStore::new());
        let owner = OwnerContext::new(UserId::new());
        let alias = DebtorAlias::parse("Marta").unwrap();

        let (removed, remaining) = rt.block_on(async {
            let debtor = ledger
                .add_debt(&owner, &alias, PositiveAmount::new(amount).unwrap())
                .await
                .unwrap()
                .into_debtor();
            let removed = ledger.delete_debtor(&owner, debtor.id()).await.unwrap();
            (removed, ledger.list_debtors(&owner).await.unwrap())
        });

        prop_assert!(removed);
        prop_assert!(remaining.is_empty());
    }
}
