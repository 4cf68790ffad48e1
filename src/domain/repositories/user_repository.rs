use async_trait::async_trait;

use crate::domain::{
    error::RepositoryError,
    models::{credential::HashedPassword, user::User},
};

/// Persistence boundary for accounts.
///
/// Implementations scope their storage resources to a single call and must
/// enforce email uniqueness atomically at insert time.
#[async_trait]
pub trait UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Returns [`RepositoryError::UniqueViolation`] when the email is taken.
    async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: HashedPassword,
    ) -> Result<User, RepositoryError>;
}
