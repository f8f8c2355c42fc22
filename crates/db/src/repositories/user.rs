//! User repository for database operations.

use chrono::Duration;
use debttracker_core::admin::Account;
use debttracker_shared::types::{PageRequest, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{debtors, users};

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl From<users::Model> for Account {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::from_uuid(model.id),
            email: model.email,
            created_at: model.created_at.to_utc(),
        }
    }
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by (normalized) email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new user. `email` must already be normalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails, including a unique
    /// violation for an email that is already registered.
    pub async fn create(&self, email: &str, password_hash: &str) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Replaces the password hash of `user`, provided the row has not changed
    /// since it was loaded. Returns false if the user is gone or the password
    /// was changed in the meantime.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update_password(
        &self,
        user: &users::Model,
        password_hash: &str,
    ) -> Result<bool, DbErr> {
        // The stamp must move even when two updates land in the same microsecond.
        let now = chrono::Utc::now().max(user.updated_at.to_utc() + Duration::microseconds(1));
        let now: sea_orm::prelude::DateTimeWithTimeZone = now.into();
        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(user.id))
            .filter(users::Column::UpdatedAt.eq(user.updated_at))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Counts all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, DbErr> {
        users::Entity::find().count(&self.db).await
    }

    /// One page of users, newest first, plus the total user count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_newest_first(
        &self,
        page: &PageRequest,
    ) -> Result<(Vec<users::Model>, u64), DbErr> {
        let total = self.count().await?;
        let users = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_asc(users::Column::Email)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((users, total))
    }

    /// Deletes a user and every debtor they own in one transaction.
    ///
    /// Returns the number of debtors removed, or `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; nothing is deleted in that case.
    pub async fn delete_with_debtors(&self, id: Uuid) -> Result<Option<u64>, DbErr> {
        let txn = self.db.begin().await?;

        if users::Entity::find_by_id(id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Ok(None);
        }

        let removed = debtors::Entity::delete_many()
            .filter(debtors::Column::OwnerId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
        users::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        info!(user_id = %id, debtors_removed = removed, "User deleted");
        Ok(Some(removed))
    }
}
