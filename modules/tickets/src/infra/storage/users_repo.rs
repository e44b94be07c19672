use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, SqlErr};
use time::OffsetDateTime;

use crate::contract::{NewUser, User};
use crate::domain::repo::{StoreError, UsersRepository};

use super::entity::{UserEntity, user};
use super::mapper::new_user_to_active_model;

pub struct SeaOrmUsersRepository {
    db: DatabaseConnection,
}

impl SeaOrmUsersRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let model = new_user_to_active_model(user, OffsetDateTime::now_utc())
            .insert(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    StoreError::Duplicate { field: "email" }
                }
                _ => e.into(),
            })?;
        model.try_into()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound)?
            .try_into()
    }
}
