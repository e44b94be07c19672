//! SeaORM-backed storage for the tickets module.

pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod tickets_repo;
pub mod users_repo;


use sea_orm::DbErr;

use crate::domain::repo::StoreError;

impl From<DbErr> for StoreError {
    fn from(e: DbErr) -> Self {
        Self::database(e.to_string())
    }
}
