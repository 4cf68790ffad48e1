use secrecy::{ExposeSecret, SecretString};

use crate::domain::error::{
    ALL_FIELDS_REQUIRED, PASSWORD_TOO_SHORT, PASSWORDS_DO_NOT_MATCH, RegistrationError,
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Registration input as received from the transport layer.
///
/// Every field is optional here so that absence is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Default)]
pub struct RegistrationRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
    pub confirm_password: Option<SecretString>,
}

/// A request that passed every local check.
#[derive(Debug)]
pub struct ValidatedRegistration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl RegistrationRequest {
    pub fn validate(self) -> Result<ValidatedRegistration, RegistrationError> {
        let (Some(name), Some(email), Some(password), Some(confirm_password)) = (
            non_empty(self.name),
            non_empty(self.email),
            self.password.filter(|p| !p.expose_secret().is_empty()),
            self.confirm_password
                .filter(|p| !p.expose_secret().is_empty()),
        ) else {
            return Err(RegistrationError::invalid_input(ALL_FIELDS_REQUIRED));
        };

        if password.expose_secret().as_bytes() != confirm_password.expose_secret().as_bytes() {
            return Err(RegistrationError::invalid_input(PASSWORDS_DO_NOT_MATCH));
        }

        if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RegistrationError::invalid_input(PASSWORD_TOO_SHORT));
        }

        Ok(ValidatedRegistration {
            name,
            email,
            password,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
