//! Credential authentication against a user store.

use std::sync::Arc;

use log::{error, warn};

use crate::error::ShopResult;
use crate::security::error::AuthError;
use crate::security::password::PasswordHasher;
use crate::security::types::Principal;
use crate::security::user_store::UserStore;

/// Validates username/password pairs and produces authenticated principals.
///
/// An unknown username and a wrong password both surface as
/// [`AuthError::InvalidCredentials`]; the unknown-user path still performs a
/// hash verification against a fixed dummy hash so that both failures cost
/// one Argon2 computation and cannot be told apart by response timing.
pub struct AuthenticationService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    dummy_hash: String,
}

impl AuthenticationService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> ShopResult<Self> {
        let dummy_hash = hasher.hash("credential-padding")?;
        Ok(Self {
            store,
            hasher,
            dummy_hash,
        })
    }

    /// Authenticate a username/password pair.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        match self.find_user(username) {
            Ok(user) => {
                if self.hasher.verify(password, &user.password_hash) {
                    Ok(Principal::new(user.username, user.roles))
                } else {
                    warn!("failed login attempt for user {}", username);
                    Err(AuthError::InvalidCredentials)
                }
            }
            Err(AuthError::UserNotFound) => {
                // Burn the same verification cost as the known-user path.
                let _ = self.hasher.verify(password, &self.dummy_hash);
                warn!("failed login attempt for unknown user");
                Err(AuthError::InvalidCredentials)
            }
            Err(other) => Err(other),
        }
    }

    fn find_user(&self, username: &str) -> Result<crate::security::types::User, AuthError> {
        match self.store.lookup(username) {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AuthError::UserNotFound),
            Err(e) => {
                // Storage faults are logged here and surface as a generic
                // credential failure; the API never distinguishes them.
                error!("user store lookup failed: {}", e);
                Err(AuthError::UserNotFound)
            }
        }
    }
}
