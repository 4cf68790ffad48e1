use crate::domain::{error::RegistrationError, models::credential::HashedPassword};

/// Service for hashing passwords
///
/// Hashing is CPU bound; async callers run it on the blocking pool.
pub trait PasswordHasher: Clone + Send + Sync + 'static {
    /// Hash a plain text password
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, RegistrationError>;
}
