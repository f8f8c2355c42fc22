//! Debtor repository: the Postgres-backed `LedgerStore`.
//!
//! Alias lookups compare `lower(alias)`, matching the unique index on
//! `(owner_id, lower(alias))`. Updates and versioned deletes carry a
//! `version = ?` predicate; zero affected rows means someone else wrote first.

use async_trait::async_trait;
use debttracker_core::ledger::{
    DebtEntry, Debtor, DebtorAlias, LedgerError, LedgerStore, OwnerContext,
};
use debttracker_shared::types::{DebtorId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    QueryFilter, QuerySelect, Set, SqlErr,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use crate::entities::debtors;

/// Debtor repository.
#[derive(Debug, Clone)]
pub struct DebtorRepository {
    db: DatabaseConnection,
}

/// Platform-wide debtor aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebtorTotals {
    /// Number of debtor rows.
    pub debtors: u64,
    /// Sum of all balances.
    pub total_debt: Decimal,
}

fn storage(err: DbErr) -> LedgerError {
    LedgerError::Storage(err.to_string())
}

/// Maps a failed write, treating unique violations as lost races.
fn write_error(err: DbErr) -> LedgerError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => LedgerError::ConcurrentModification,
        _ => storage(err),
    }
}

/// Converts a row into a domain debtor, checking the cached total.
fn to_domain(model: debtors::Model) -> Result<Debtor, LedgerError> {
    let id = DebtorId::from_uuid(model.id);
    let alias = DebtorAlias::parse(&model.alias)
        .map_err(|e| LedgerError::Storage(format!("debtor {id} has an invalid alias: {e}")))?;
    let debts: Vec<DebtEntry> = serde_json::from_value(model.debts)
        .map_err(|e| LedgerError::Storage(format!("debtor {id} has malformed entries: {e}")))?;

    Debtor::from_parts(
        id,
        UserId::from_uuid(model.owner_id),
        alias,
        model.total_debt,
        debts,
        model.version,
    )
}

fn debts_json(debtor: &Debtor) -> Result<serde_json::Value, LedgerError> {
    serde_json::to_value(debtor.debts())
        .map_err(|e| LedgerError::Storage(format!("failed to encode entries: {e}")))
}

fn alias_matches(alias: &DebtorAlias) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col((
        debtors::Entity,
        debtors::Column::Alias,
    ))))
    .eq(alias.key())
}

impl DebtorRepository {
    /// Creates a new debtor repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Debtors owned by any of `owner_ids`, for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is inconsistent.
    pub async fn list_for_owners(&self, owner_ids: &[Uuid]) -> Result<Vec<Debtor>, LedgerError> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }

        debtors::Entity::find()
            .filter(debtors::Column::OwnerId.is_in(owner_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Row count and balance sum across all owners.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn totals(&self) -> Result<DebtorTotals, DbErr> {
        #[derive(Debug, FromQueryResult)]
        struct TotalsRow {
            debtors: i64,
            total_debt: Option<Decimal>,
        }

        let row = debtors::Entity::find()
            .select_only()
            .column_as(debtors::Column::Id.count(), "debtors")
            .column_as(debtors::Column::TotalDebt.sum(), "total_debt")
            .into_model::<TotalsRow>()
            .one(&self.db)
            .await?;

        Ok(row.map_or(
            DebtorTotals {
                debtors: 0,
                total_debt: Decimal::ZERO,
            },
            |r| DebtorTotals {
                debtors: u64::try_from(r.debtors).unwrap_or_default(),
                total_debt: r.total_debt.unwrap_or_default(),
            },
        ))
    }
}

#[async_trait]
impl LedgerStore for DebtorRepository {
    async fn find_by_alias(
        &self,
        owner: &OwnerContext,
        alias: &DebtorAlias,
    ) -> Result<Option<Debtor>, LedgerError> {
        debtors::Entity::find()
            .filter(debtors::Column::OwnerId.eq(owner.user_id.into_inner()))
            .filter(alias_matches(alias))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(to_domain)
            .transpose()
    }

    async fn find_by_id(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
    ) -> Result<Option<Debtor>, LedgerError> {
        debtors::Entity::find_by_id(id.into_inner())
            .filter(debtors::Column::OwnerId.eq(owner.user_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(to_domain)
            .transpose()
    }

    async fn list(&self, owner: &OwnerContext) -> Result<Vec<Debtor>, LedgerError> {
        debtors::Entity::find()
            .filter(debtors::Column::OwnerId.eq(owner.user_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(storage)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn insert(&self, owner: &OwnerContext, debtor: &Debtor) -> Result<Debtor, LedgerError> {
        let now = chrono::Utc::now().into();
        let model = debtors::ActiveModel {
            id: Set(debtor.id().into_inner()),
            owner_id: Set(owner.user_id.into_inner()),
            alias: Set(debtor.alias().to_string()),
            total_debt: Set(debtor.total_debt()),
            debts: Set(debts_json(debtor)?),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(&self.db).await.map_err(write_error)?;
        to_domain(inserted)
    }

    async fn update(&self, owner: &OwnerContext, debtor: &Debtor) -> Result<Debtor, LedgerError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let next_version = debtor.version() + 1;

        let result = debtors::Entity::update_many()
            .col_expr(debtors::Column::TotalDebt, Expr::value(debtor.total_debt()))
            .col_expr(debtors::Column::Debts, Expr::value(debts_json(debtor)?))
            .col_expr(debtors::Column::Version, Expr::value(next_version))
            .col_expr(debtors::Column::UpdatedAt, Expr::value(now))
            .filter(debtors::Column::Id.eq(debtor.id().into_inner()))
            .filter(debtors::Column::OwnerId.eq(owner.user_id.into_inner()))
            .filter(debtors::Column::Version.eq(debtor.version()))
            .exec(&self.db)
            .await
            .map_err(write_error)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::ConcurrentModification);
        }

        Ok(debtor.clone().with_version(next_version))
    }

    async fn delete(
        &self,
        owner: &OwnerContext,
        id: DebtorId,
        expected_version: Option<i64>,
    ) -> Result<bool, LedgerError> {
        let mut query = debtors::Entity::delete_many()
            .filter(debtors::Column::Id.eq(id.into_inner()))
            .filter(debtors::Column::OwnerId.eq(owner.user_id.into_inner()));
        if let Some(version) = expected_version {
            query = query.filter(debtors::Column::Version.eq(version));
        }

        let result = query.exec(&self.db).await.map_err(storage)?;

        match (result.rows_affected, expected_version) {
            (0, Some(_)) => Err(LedgerError::ConcurrentModification),
            (0, None) => Ok(false),
            _ => Ok(true),
        }
    }
}
