//! `SeaORM` entity definitions.

pub mod debtors;
pub mod users;
