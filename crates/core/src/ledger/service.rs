//! Debt ledger operations.
//!
//! Each operation is one read followed by at most one write against the
//! injected [`LedgerStore`]. Business outcomes are returned as values;
//! only conflicts and storage failures are errors.

use chrono::Utc;
use debttracker_shared::types::DebtorId;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::error::LedgerError;
use super::store::LedgerStore;
use super::types::{AddDebtOutcome, Debtor, OwnerContext, PaymentOutcome};
use super::validation::{DebtorAlias, PositiveAmount};

/// The debt ledger, bound to a store.
#[derive(Debug, Clone)]
pub struct DebtLedger<S> {
    store: S,
}

impl<S: LedgerStore> DebtLedger<S> {
    /// Creates a ledger over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Records a new debt under `alias`, opening the debtor if needed.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ConcurrentModification` if the record changed
    /// since it was read, `AmountOverflow` if the total is not representable,
    /// or a storage error.
    pub async fn add_debt(
        &self,
        owner: &OwnerContext,
        alias: &DebtorAlias,
        amount: PositiveAmount,
    ) -> Result<AddDebtOutcome, LedgerError> {
        let now = Utc::now();

        match self.store.find_by_alias(owner, alias).await? {
            Some(mut debtor) => {
                debtor.record(amount.value(), now)?;
                let saved = self.store.update(owner, &debtor).await?;
                debug!(
                    debtor_id = %saved.id(),
                    total_debt = %saved.total_debt(),
                    "Debt added to existing debtor"
                );
                Ok(AddDebtOutcome::Updated(saved))
            }
            None => {
                let debtor = Debtor::open(owner, alias.clone(), amount, now);
                let saved = self.store.insert(owner, &debtor).await?;
                info!(
                    user_id = %owner.user_id,
                    debtor_id = %saved.id(),
                    "Debtor opened"
                );
                Ok(AddDebtOutcome::Created(saved))
            }
        }
    }

    /// Records a payment from `alias`.
    ///
    /// A payment larger than the balance is refused. A payment that brings the
    /// balance to zero deletes the record.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::ConcurrentModification` if the record changed
    /// since it was read, or a storage error.
    pub async fn pay_debt(
        &self,
        owner: &OwnerContext,
        alias: &DebtorAlias,
        amount: PositiveAmount,
    ) -> Result<PaymentOutcome, LedgerError> {
        let Some(mut debtor) = self.store.find_by_alias(owner, alias).await? else {
            return Ok(PaymentOutcome::DebtorNotFound);
        };

        if amount.value() > debtor.total_debt() {
            return Ok(PaymentOutcome::ExceedsDebt {
                total_debt: debtor.total_debt(),
            });
        }

        let loaded_version = debtor.version();
        debtor.record(-amount.value(), Utc::now())?;

        if debtor.total_debt() <= Decimal::ZERO {
            self.store
                .delete(owner, debtor.id(), Some(loaded_version))
                .await?;
            info!(
                user_id = %owner.user_id,
                debtor_id = %debtor.id(),
                "Debt settled, debtor removed"
            );
            return Ok(PaymentOutcome::Settled {
                debtor_id: debtor.id(),
                alias: debtor.alias().clone(),
            });
        }

        let saved = self.store.update(owner, &debtor).await?;
        debug!(
            debtor_id = %saved.id(),
            total_debt = %saved.total_debt(),
            "Payment recorded"
        );
        Ok(PaymentOutcome::Recorded(saved))
    }

    /// Removes a debtor regardless of balance. Returns whether one was removed.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn delete_debtor(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
    ) -> Result<bool, LedgerError> {
        let removed = self.store.delete(owner, id, None).await?;
        if removed {
            info!(user_id = %owner.user_id, debtor_id = %id, "Debtor deleted");
        }
        Ok(removed)
    }

    /// Removes the debtor matching `alias` regardless of balance.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn delete_debtor_by_alias(
        &self,
        owner: &OwnerContext,
        alias: &DebtorAlias,
    ) -> Result<bool, LedgerError> {
        match self.store.find_by_alias(owner, alias).await? {
            Some(debtor) => self.delete_debtor(owner, debtor.id()).await,
            None => Ok(false),
        }
    }

    /// All of the owner's debtors, unordered.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn list_debtors(&self, owner: &OwnerContext) -> Result<Vec<Debtor>, LedgerError> {
        self.store.list(owner).await
    }

    /// The owner's debtor matching `alias`, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn get_debtor(
        &self,
        owner: &OwnerContext,
        alias: &DebtorAlias,
    ) -> Result<Option<Debtor>, LedgerError> {
        self.store.find_by_alias(owner, alias).await
    }

    /// The owner's debtor with `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn get_debtor_by_id(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
    ) -> Result<Option<Debtor>, LedgerError> {
        self.store.find_by_id(owner, id).await
    }
}
