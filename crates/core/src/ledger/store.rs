//! Storage capability for debtor records.
//!
//! The ledger never reaches a database directly; it is handed a
//! `LedgerStore`. Writes of a previously loaded record are conditional on its
//! `version`, which is how lost updates between concurrent sessions surface
//! as `LedgerError::ConcurrentModification` instead of silently winning.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use debttracker_shared::types::DebtorId;
use tokio::sync::Mutex;

use super::error::LedgerError;
use super::types::{Debtor, OwnerContext};
use super::validation::DebtorAlias;

/// Read, write and delete access to an owner's debtor records.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Finds the owner's debtor whose alias matches case-insensitively.
    async fn find_by_alias(
        &self,
        owner: &OwnerContext,
        alias: &DebtorAlias,
    ) -> Result<Option<Debtor>, LedgerError>;

    /// Finds one of the owner's debtors by id.
    async fn find_by_id(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
    ) -> Result<Option<Debtor>, LedgerError>;

    /// Lists all of the owner's debtors, in no particular order.
    async fn list(&self, owner: &OwnerContext) -> Result<Vec<Debtor>, LedgerError>;

    /// Inserts a new record and returns it as stored.
    ///
    /// Fails with `ConcurrentModification` if the owner already has a debtor
    /// with a matching alias.
    async fn insert(&self, owner: &OwnerContext, debtor: &Debtor) -> Result<Debtor, LedgerError>;

    /// Replaces a loaded record and returns it with its new version.
    ///
    /// Fails with `ConcurrentModification` if the stored version no longer
    /// matches `debtor.version()` or the record is gone.
    async fn update(&self, owner: &OwnerContext, debtor: &Debtor) -> Result<Debtor, LedgerError>;

    /// Deletes a record. With `expected_version` set, the delete only happens
    /// if the stored version matches, otherwise `ConcurrentModification`.
    ///
    /// Returns whether a record was removed.
    async fn delete(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
        expected_version: Option<i64>,
    ) -> Result<bool, LedgerError>;
}

#[async_trait]
impl<T: LedgerStore + ?Sized> LedgerStore for Arc<T> {
    async fn find_by_alias(
        &self,
        owner: &OwnerContext,
        alias: &DebtorAlias,
    ) -> Result<Option<Debtor>, LedgerError> {
        (**self).find_by_alias(owner, alias).await
    }

    async fn find_by_id(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
    ) -> Result<Option<Debtor>, LedgerError> {
        (**self).find_by_id(owner, id).await
    }

    async fn list(&self, owner: &OwnerContext) -> Result<Vec<Debtor>, LedgerError> {
        (**self).list(owner).await
    }

    async fn insert(&self, owner: &OwnerContext, debtor: &Debtor) -> Result<Debtor, LedgerError> {
        (**self).insert(owner, debtor).await
    }

    async fn update(&self, owner: &OwnerContext, debtor: &Debtor) -> Result<Debtor, LedgerError> {
        (**self).update(owner, debtor).await
    }

    async fn delete(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
        expected_version: Option<i64>,
    ) -> Result<bool, LedgerError> {
        (**self).delete(owner, id, expected_version).await
    }
}

/// Process-local store, keyed by debtor id.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    records: Mutex<HashMap<DebtorId, Debtor>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all owners.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Returns true if no owner has any record.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

fn owned_by<'a>(owner: &OwnerContext, debtor: &'a Debtor) -> Option<&'a Debtor> {
    (debtor.owner_id() == owner.user_id).then_some(debtor)
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find_by_alias(
        &self,
        owner: &OwnerContext,
        alias: &DebtorAlias,
    ) -> Result<Option<Debtor>, LedgerError> {
        let records = self.records.lock().await;
        Ok(records
            .values()
            .filter_map(|d| owned_by(owner, d))
            .find(|d| d.alias().matches(alias))
            .cloned())
    }

    async fn find_by_id(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
    ) -> Result<Option<Debtor>, LedgerError> {
        let records = self.records.lock().await;
        Ok(records.get(&id).and_then(|d| owned_by(owner, d)).cloned())
    }

    async fn list(&self, owner: &OwnerContext) -> Result<Vec<Debtor>, LedgerError> {
        let records = self.records.lock().await;
        Ok(records
            .values()
            .filter_map(|d| owned_by(owner, d))
            .cloned()
            .collect())
    }

    async fn insert(&self, owner: &OwnerContext, debtor: &Debtor) -> Result<Debtor, LedgerError> {
        let mut records = self.records.lock().await;

        let taken = records
            .values()
            .filter_map(|d| owned_by(owner, d))
            .any(|d| d.alias().matches(debtor.alias()));
        if taken || records.contains_key(&debtor.id()) {
            return Err(LedgerError::ConcurrentModification);
        }

        let stored = debtor.clone().with_version(0);
        records.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, owner: &OwnerContext, debtor: &Debtor) -> Result<Debtor, LedgerError> {
        let mut records = self.records.lock().await;

        let current = records
            .get(&debtor.id())
            .and_then(|d| owned_by(owner, d))
            .ok_or(LedgerError::ConcurrentModification)?;
        if current.version() != debtor.version() {
            return Err(LedgerError::ConcurrentModification);
        }

        let stored = debtor.clone().with_version(debtor.version() + 1);
        records.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn delete(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
        expected_version: Option<i64>,
    ) -> Result<bool, LedgerError> {
        let mut records = self.records.lock().await;

        let Some(current) = records.get(&id).and_then(|d| owned_by(owner, d)) else {
            return match expected_version {
                Some(_) => Err(LedgerError::ConcurrentModification),
                None => Ok(false),
            };
        };
        if expected_version.is_some_and(|v| v != current.version()) {
            return Err(LedgerError::ConcurrentModification);
        }

        records.remove(&id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use debttracker_shared::types::UserId;
    use rust_decimal_macros::dec;

    use crate::ledger::validation::PositiveAmount;

    fn debtor(owner: &OwnerContext, alias: &str) -> Debtor {
        Debtor::open(
            owner,
            DebtorAlias::parse(alias).unwrap(),
            PositiveAmount::new(dec!(10)).unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_records_are_scoped_by_owner() {
        let store = InMemoryLedgerStore::new();
        let alice = OwnerContext::new(UserId::new());
        let bob = OwnerContext::new(UserId::new());

        let stored = store.insert(&alice, &debtor(&alice, "Ana")).await.unwrap();
        store.insert(&bob, &debtor(&bob, "Ana")).await.unwrap();

        assert_eq!(store.list(&alice).await.unwrap().len(), 1);
        assert!(store.find_by_id(&bob, stored.id()).await.unwrap().is_none());
        assert!(!store.delete(&bob, stored.id(), None).await.unwrap());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_alias_insert_conflicts() {
        let store = InMemoryLedgerStore::new();
        let owner = OwnerContext::new(UserId::new());

        store.insert(&owner, &debtor(&owner, "Bob")).await.unwrap();
        let err = store
            .insert(&owner, &debtor(&owner, "BOB"))
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::ConcurrentModification));
    }

    #[tokio::test]
    async fn test_stale_update_conflicts() {
        let store = InMemoryLedgerStore::new();
        let owner = OwnerContext::new(UserId::new());
        let stored = store.insert(&owner, &debtor(&owner, "Ana")).await.unwrap();

        let mut first = stored.clone();
        let mut second = stored;
        first.record(dec!(5), Utc::now()).unwrap();
        second.record(dec!(7), Utc::now()).unwrap();

        let saved = store.update(&owner, &first).await.unwrap();
        assert_eq!(saved.version(), 1);

        let err = store.update(&owner, &second).await.unwrap_err();
        assert!(matches!(err, LedgerError::ConcurrentModification));

        let alias = DebtorAlias::parse("ana").unwrap();
        let current = store.find_by_alias(&owner, &alias).await.unwrap().unwrap();
        assert_eq!(current.total_debt(), dec!(15));
    }

    #[tokio::test]
    async fn test_versioned_delete() {
        let store = InMemoryLedgerStore::new();
        let owner = OwnerContext::new(UserId::new());
        let stored = store.insert(&owner, &debtor(&owner, "Ana")).await.unwrap();

        let err = store
            .delete(&owner, stored.id(), Some(stored.version() + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ConcurrentModification));

        assert!(
            store
                .delete(&owner, stored.id(), Some(stored.version()))
                .await
                .unwrap()
        );
        assert!(store.is_empty().await);
    }
}
