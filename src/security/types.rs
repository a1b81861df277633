//! Core identity types.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A role capability label in canonical `ROLE_<NAME>` form.
pub type Role = String;

/// Role granted to storefront customers.
pub const ROLE_CUSTOMER: &str = "ROLE_CUSTOMER";
/// Role granted to shop employees.
pub const ROLE_EMPLOYEE: &str = "ROLE_EMPLOYEE";
/// Role granted to administrators.
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// A stored user record.
///
/// The password hash is an opaque PHC string produced by
/// [`crate::security::password::PasswordHasher`]; the plaintext never
/// appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// A transient username/password pair.
///
/// Used only to carry submitted credentials from the HTTP layer into
/// [`crate::security::auth_service::AuthenticationService`]; dropped after
/// verification and never persisted.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// The plaintext password must never reach any log output.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated identity attached to a request.
///
/// Only constructed from verified input: a successful credential check or a
/// signature-verified token. An unverified token never produces a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub roles: HashSet<Role>,
}

impl Principal {
    pub fn new(username: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            username: username.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Whether this principal holds the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}
