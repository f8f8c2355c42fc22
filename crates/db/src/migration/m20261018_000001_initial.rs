//! Initial schema: users and their debtors.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SCHEMA_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS debtors CASCADE; DROP TABLE IF EXISTS users CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_email_normalized CHECK (email = lower(btrim(email)))
);

CREATE UNIQUE INDEX idx_users_email ON users(email);

-- Admin dashboard lists newest accounts first
CREATE INDEX idx_users_created ON users(created_at DESC);

CREATE TABLE debtors (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    alias VARCHAR(50) NOT NULL,
    total_debt NUMERIC NOT NULL,
    debts JSONB NOT NULL DEFAULT '[]'::jsonb,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_total_positive CHECK (total_debt > 0),
    CONSTRAINT chk_debts_array CHECK (jsonb_typeof(debts) = 'array')
);

-- One debtor per alias per owner, case-insensitive
CREATE UNIQUE INDEX idx_debtors_owner_alias ON debtors(owner_id, lower(alias));
";
