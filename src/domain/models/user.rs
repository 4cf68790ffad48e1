use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::credential::HashedPassword;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);
impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Persisted account, including its credential hash.
///
/// Not `Serialize`: anything leaving the service goes through [`PublicAccount`].
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    password_hash: HashedPassword,
}

impl User {
    pub fn new(id: UserId, name: String, email: String, password_hash: HashedPassword) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn password_hash(&self) -> &HashedPassword {
        &self.password_hash
    }
}

/// The caller-facing view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for PublicAccount {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}
