//! User record lookup behind a single storage capability.
//!
//! Two variants exist: [`InMemoryUserStore`] seeds a fixed demo set at
//! startup and is immutable afterwards; [`PersistentUserStore`] keeps
//! records in a sled tree for deployments with externally managed users.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::info;

use crate::error::ShopResult;
use crate::security::password::PasswordHasher;
use crate::security::types::{User, ROLE_ADMIN, ROLE_CUSTOMER, ROLE_EMPLOYEE};

/// Lookup of user records by username. Read-only after initialization.
pub trait UserStore: Send + Sync {
    fn lookup(&self, username: &str) -> ShopResult<Option<User>>;
}

impl<T: UserStore + ?Sized> UserStore for Arc<T> {
    fn lookup(&self, username: &str) -> ShopResult<Option<User>> {
        (**self).lookup(username)
    }
}

/// In-memory user store, populated once at construction.
pub struct InMemoryUserStore {
    users: HashMap<String, User>,
}

impl InMemoryUserStore {
    /// Build a store from an explicit user list.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.username.clone(), user))
                .collect(),
        }
    }

    /// Build the demo store with the three seeded identities:
    /// `customer`, `employee`, and `admin`, each holding one role and a
    /// password equal to the username. Hashes are computed at seed time.
    pub fn seeded(hasher: &PasswordHasher) -> ShopResult<Self> {
        let seeds = [
            ("customer", ROLE_CUSTOMER),
            ("employee", ROLE_EMPLOYEE),
            ("admin", ROLE_ADMIN),
        ];

        let mut users = Vec::with_capacity(seeds.len());
        for (username, role) in seeds {
            users.push(User {
                username: username.to_string(),
                password_hash: hasher.hash(username)?,
                roles: vec![role.to_string()],
            });
        }

        info!("Seeded in-memory user store with {} identities", users.len());
        Ok(Self::with_users(users))
    }
}

impl UserStore for InMemoryUserStore {
    fn lookup(&self, username: &str) -> ShopResult<Option<User>> {
        Ok(self.users.get(username).cloned())
    }
}

/// Sled-backed user store for externally managed user data.
pub struct PersistentUserStore {
    tree: sled::Db,
}

impl PersistentUserStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> ShopResult<Self> {
        let tree = sled::open(path)?;
        Ok(Self { tree })
    }

    /// Insert or replace a user record.
    pub fn insert(&self, user: &User) -> ShopResult<()> {
        let encoded = serde_json::to_vec(user)?;
        self.tree.insert(user.username.as_bytes(), encoded)?;
        self.tree.flush()?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl UserStore for PersistentUserStore {
    fn lookup(&self, username: &str) -> ShopResult<Option<User>> {
        match self.tree.get(username.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }
}
