use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHasher as Argon2Hasher, SaltString, rand_core::OsRng},
};

use crate::domain::{
    error::RegistrationError,
    models::credential::HashedPassword,
    services::password_service::PasswordHasher,
};

/// Argon2id cost settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Cost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Cost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Fails with `Misconfiguration` when argon2 rejects the cost settings.
    pub fn with_cost(cost: Argon2Cost) -> Result<Self, RegistrationError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| {
                RegistrationError::Misconfiguration(format!("invalid argon2 parameters: {e}"))
            })?;
        Ok(Self { params })
    }

    /// Check a plain text password against a stored PHC string.
    #[cfg(test)]
    pub fn verify(
        &self,
        plain_password: &str,
        hashed_password: &HashedPassword,
    ) -> Result<bool, RegistrationError> {
        use argon2::{PasswordHash, PasswordVerifier};

        let parsed_hash = PasswordHash::new(hashed_password.as_str()).map_err(|e| {
            RegistrationError::StorageFailure(format!("stored hash is not a PHC string: {e}"))
        })?;

        // parameters are read back from the PHC string
        Ok(self
            .argon2()
            .verify_password(plain_password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain_password: &str) -> Result<HashedPassword, RegistrationError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plain_password.as_bytes(), &salt)
            .map_err(|e| {
                RegistrationError::StorageFailure(format!("password hashing failed: {e}"))
            })?
            .to_string();

        Ok(HashedPassword::new(hash))
    }
}
