use thiserror::Error;

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const PASSWORD_TOO_SHORT: &str = "Password too short";
pub const EMAIL_ALREADY_EXISTS: &str = "User with this email already exists";

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
}

impl RegistrationError {
    pub fn invalid_input(message: &str) -> Self {
        Self::InvalidInput(message.to_string())
    }

    pub fn email_conflict() -> Self {
        Self::Conflict(EMAIL_ALREADY_EXISTS.to_string())
    }
}

impl From<RepositoryError> for RegistrationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // the insert-time constraint is what actually decides a race
            RepositoryError::UniqueViolation => Self::email_conflict(),
            RepositoryError::DatabaseError(detail) => Self::StorageFailure(detail),
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Unique constraint violation")]
    UniqueViolation,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_conflict() {
        let err: RegistrationError = RepositoryError::UniqueViolation.into();
        match err {
            RegistrationError::Conflict(message) => assert_eq!(message, EMAIL_ALREADY_EXISTS),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn database_error_becomes_storage_failure() {
        let err: RegistrationError =
            RepositoryError::DatabaseError("connection refused".to_string()).into();
        assert!(matches!(err, RegistrationError::StorageFailure(d) if d == "connection refused"));
    }
}
