//! User domain types.

use serde::{Deserialize, Serialize};

use crate::store::{Record, TableName, UniqueKey};
use crate::types::UserId;

/// A user allowed to sign in to the registry.
///
/// Passwords are kept and compared in plaintext; the registry makes no
/// security promises about them. `Debug` output redacts the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    #[serde(rename = "nome")]
    pub name: String,
    /// Login name, unique across users.
    #[serde(rename = "usuario")]
    pub username: String,
    /// Plaintext password.
    #[serde(rename = "senha")]
    pub password: String,
}

impl User {
    pub(crate) fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Record for User {
    type Id = UserId;
    const TABLE: TableName = TableName::Users;

    fn id(&self) -> UserId {
        self.id
    }

    fn unique_key(&self) -> Option<UniqueKey<'_>> {
        Some(UniqueKey {
            field: "usuario",
            value: &self.username,
        })
    }
}
