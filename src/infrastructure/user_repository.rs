use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, SqlErr,
    TransactionTrait,
};
use tracing::debug;

use crate::domain::{
    error::RepositoryError,
    models::{
        credential::HashedPassword,
        user::{User, UserId},
    },
    repositories::user_repository::UserRepository,
};
use entity::users;

#[derive(Clone)]
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn map_db_err(err: DbErr) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::UniqueViolation,
        _ => RepositoryError::DatabaseError(err.to_string()),
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        User::new(
            UserId::from_uuid(model.id),
            model.name,
            model.email,
            HashedPassword::new(model.password_hash),
        )
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(user.map(User::from))
    }

    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: HashedPassword,
    ) -> Result<User, RepositoryError> {
        // Begin transaction; dropping it on an early return rolls back
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let user = User::new(
            UserId::new(),
            name.to_string(),
            email.to_string(),
            password_hash,
        );
        let user_model = users::ActiveModel {
            id: Set(*user.id().as_uuid()),
            name: Set(user.name().to_string()),
            email: Set(user.email().to_string()),
            password_hash: Set(user.password_hash().as_str().to_string()),
            created_at: Set(chrono::Utc::now().fixed_offset()),
        };

        users::Entity::insert(user_model)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        debug!(user_id = %user.id(), "user row committed");

        Ok(user)
    }
}
