//! `SeaORM` Entity for users table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Changes whenever the password does; reset tokens are bound to it.
    #[must_use]
    pub fn credential_stamp(&self) -> i64 {
        self.updated_at.timestamp_micros()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::debtors::Entity")]
    Debtors,
}

impl Related<super::debtors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debtors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
