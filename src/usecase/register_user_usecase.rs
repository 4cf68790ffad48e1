use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::domain::{
    error::RegistrationError,
    models::{
        registration::{RegistrationRequest, ValidatedRegistration},
        user::PublicAccount,
    },
    repositories::user_repository::UserRepository,
    services::password_service::PasswordHasher,
};

pub struct RegisterUserUsecase<R: UserRepository, P: PasswordHasher> {
    user_repository: R,
    password_hasher: P,
}

impl<R: UserRepository, P: PasswordHasher> RegisterUserUsecase<R, P> {
    pub fn new(user_repository: R, password_hasher: P) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    #[tracing::instrument(skip_all, fields(email = request.email.as_deref().unwrap_or("")))]
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<PublicAccount, RegistrationError>
    where
        R: Send + Sync,
    {
        let ValidatedRegistration {
            name,
            email,
            password,
        } = request.validate()?;

        // Fast path only; the insert below is the authoritative check
        if self.user_repository.find_by_email(&email).await?.is_some() {
            debug!("email already registered");
            return Err(RegistrationError::email_conflict());
        }

        // Hash on the blocking pool so slow hashing never stalls other requests
        let hasher = self.password_hasher.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
                .await
                .map_err(|e| {
                    RegistrationError::StorageFailure(format!("password hashing task failed: {e}"))
                })??;

        let user = self
            .user_repository
            .insert(&name, &email, password_hash)
            .await?;

        info!(user_id = %user.id(), "account created");
        Ok(PublicAccount::from(user))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use secrecy::SecretString;
    use tokio::sync::Barrier;

    use super::*;
    use crate::{
        domain::{
            error::{
                ALL_FIELDS_REQUIRED, EMAIL_ALREADY_EXISTS, PASSWORD_TOO_SHORT,
                PASSWORDS_DO_NOT_MATCH, RepositoryError,
            },
            models::{
                credential::HashedPassword,
                user::{User, UserId},
            },
        },
        infrastructure::argon2_password_hasher::{Argon2Cost, Argon2PasswordHasher},
    };

    /// In-memory store that enforces uniqueness at insert, like a real table.
    #[derive(Clone, Default)]
    struct InMemoryUserRepository {
        rows: Arc<Mutex<HashMap<String, User>>>,
        reads: Arc<AtomicUsize>,
        writes: Arc<AtomicUsize>,
        /// Pretend every lookup misses, forcing the insert-time guard to decide.
        stale_lookups: bool,
        fail_inserts: bool,
    }

    impl InMemoryUserRepository {
        fn stale() -> Self {
            Self {
                stale_lookups: true,
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail_inserts: true,
                ..Self::default()
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn rows_with_email(&self, email: &str) -> usize {
            self.rows
                .lock()
                .unwrap()
                .values()
                .filter(|u| u.email() == email)
                .count()
        }

        fn stored(&self, email: &str) -> Option<User> {
            self.rows.lock().unwrap().get(email).cloned()
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.stale_lookups {
                tokio::task::yield_now().await;
                return Ok(None);
            }
            Ok(self.rows.lock().unwrap().get(email).cloned())
        }

        async fn insert(
            &self,
            name: &str,
            email: &str,
            password_hash: HashedPassword,
        ) -> Result<User, RepositoryError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_inserts {
                return Err(RepositoryError::DatabaseError(
                    "connection to server at 10.0.0.5:5432 refused".to_string(),
                ));
            }
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(email) {
                return Err(RepositoryError::UniqueViolation);
            }
            let user = User::new(
                UserId::new(),
                name.to_string(),
                email.to_string(),
                password_hash,
            );
            rows.insert(email.to_string(), user.clone());
            Ok(user)
        }
    }

    fn fast_hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::with_cost(Argon2Cost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn request(email: &str, password: &str, confirm: &str) -> RegistrationRequest {
        RegistrationRequest {
            name: Some("Ada Lovelace".to_string()),
            email: Some(email.to_string()),
            password: Some(SecretString::from(password)),
            confirm_password: Some(SecretString::from(confirm)),
        }
    }

    #[tokio::test]
    async fn registers_new_account() {
        let repo = InMemoryUserRepository::default();
        let usecase = RegisterUserUsecase::new(repo.clone(), fast_hasher());

        let account = usecase
            .register(request("ada@example.com", "hunter22", "hunter22"))
            .await
            .unwrap();

        assert_eq!(account.name, "Ada Lovelace");
        assert_eq!(account.email, "ada@example.com");
        assert_eq!(repo.reads(), 1);
        assert_eq!(repo.writes(), 1);

        let stored = repo.stored("ada@example.com").unwrap();
        assert_eq!(stored.id(), &account.id);
    }

    #[tokio::test]
    async fn stored_hash_is_not_plaintext_and_verifies() {
        let repo = InMemoryUserRepository::default();
        let hasher = fast_hasher();
        let usecase = RegisterUserUsecase::new(repo.clone(), hasher.clone());

        usecase
            .register(request("ada@example.com", "hunter22", "hunter22"))
            .await
            .unwrap();

        let stored = repo.stored("ada@example.com").unwrap();
        assert_ne!(stored.password_hash().as_str(), "hunter22");
        assert!(hasher.verify("hunter22", stored.password_hash()).unwrap());
        assert!(!hasher.verify("hunter23", stored.password_hash()).unwrap());
    }

    #[tokio::test]
    async fn validation_failures_touch_no_storage() {
        let repo = InMemoryUserRepository::default();
        let usecase = RegisterUserUsecase::new(repo.clone(), fast_hasher());

        let cases = [
            (
                RegistrationRequest {
                    email: None,
                    ..request("", "hunter22", "hunter22")
                },
                ALL_FIELDS_REQUIRED,
            ),
            (request("ada@example.com", "hunter22", "hunter23"), PASSWORDS_DO_NOT_MATCH),
            (request("ada@example.com", "abc", "abc"), PASSWORD_TOO_SHORT),
        ];

        for (req, expected) in cases {
            match usecase.register(req).await {
                Err(RegistrationError::InvalidInput(message)) => assert_eq!(message, expected),
                other => panic!("expected invalid input, got {other:?}"),
            }
        }
        assert_eq!(repo.reads(), 0);
        assert_eq!(repo.writes(), 0);
    }

    #[tokio::test]
    async fn second_registration_conflicts_without_writing() {
        let repo = InMemoryUserRepository::default();
        let usecase = RegisterUserUsecase::new(repo.clone(), fast_hasher());

        usecase
            .register(request("ada@example.com", "hunter22", "hunter22"))
            .await
            .unwrap();
        let err = usecase
            .register(request("ada@example.com", "different1", "different1"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::Conflict(ref m) if m == EMAIL_ALREADY_EXISTS));
        assert_eq!(repo.writes(), 1);
        assert_eq!(repo.rows_with_email("ada@example.com"), 1);
    }

    #[tokio::test]
    async fn insert_time_violation_is_conflict() {
        // lookup misses, so only the insert guard can catch the duplicate
        let repo = InMemoryUserRepository::stale();
        let usecase = RegisterUserUsecase::new(repo.clone(), fast_hasher());

        usecase
            .register(request("ada@example.com", "hunter22", "hunter22"))
            .await
            .unwrap();
        let err = usecase
            .register(request("ada@example.com", "hunter22", "hunter22"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::Conflict(_)));
        assert_eq!(repo.writes(), 2);
        assert_eq!(repo.rows_with_email("ada@example.com"), 1);
    }

    #[tokio::test]
    async fn storage_error_is_storage_failure() {
        let repo = InMemoryUserRepository::failing();
        let usecase = RegisterUserUsecase::new(repo, fast_hasher());

        let err = usecase
            .register(request("ada@example.com", "hunter22", "hunter22"))
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrationError::StorageFailure(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicates_yield_exactly_one_account() {
        const ATTEMPTS: usize = 8;

        let repo = InMemoryUserRepository::stale();
        let usecase = Arc::new(RegisterUserUsecase::new(repo.clone(), fast_hasher()));
        let barrier = Arc::new(Barrier::new(ATTEMPTS));

        let handles: Vec<_> = (0..ATTEMPTS)
            .map(|_| {
                let usecase = Arc::clone(&usecase);
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    barrier.wait().await;
                    usecase
                        .register(request("race@example.com", "hunter22", "hunter22"))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(RegistrationError::Conflict(_)) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(repo.rows_with_email("race@example.com"), 1);
    }
}
