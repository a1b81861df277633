//! Server-side web sessions.
//!
//! Sessions live in process memory: the cookie carries only an opaque random
//! identifier, never identity data. Entries expire after a fixed TTL and the
//! store holds a bounded number of sessions, evicting the oldest when full.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use log::{debug, info};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::security::types::Principal;

struct SessionEntry {
    principal: Principal,
    created_at: Instant,
    expires_at: Instant,
}

/// In-memory session store keyed by opaque session id.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
    max_sessions: usize,
    cookie_name: String,
}

impl SessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(config.ttl_secs),
            max_sessions: config.max_sessions,
            cookie_name: config.cookie_name.clone(),
        }
    }

    /// Name of the cookie carrying the session id.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Create a session for an authenticated principal and return its id.
    pub fn create(&self, principal: Principal) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Instant::now();

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Self::prune(&mut sessions, now);
        if sessions.len() >= self.max_sessions {
            Self::evict_oldest(&mut sessions);
        }

        info!("Session created for user {}", principal.username);
        sessions.insert(
            id.clone(),
            SessionEntry {
                principal,
                created_at: now,
                expires_at: now + self.ttl,
            },
        );
        id
    }

    /// Resolve a session id to its principal. Expired entries are removed
    /// and resolve to nothing.
    pub fn resolve(&self, id: &str) -> Option<Principal> {
        let now = Instant::now();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match sessions.get(id) {
            Some(entry) if entry.expires_at > now => Some(entry.principal.clone()),
            Some(_) => {
                debug!("Session expired");
                sessions.remove(id);
                None
            }
            None => None,
        }
    }

    /// Remove a session, if present. Unknown ids are a no-op.
    pub fn destroy(&self, id: &str) {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = sessions.remove(id) {
            info!("Session ended for user {}", entry.principal.username);
        }
    }

    pub fn active_sessions(&self) -> usize {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.len()
    }

    fn prune(sessions: &mut HashMap<String, SessionEntry>, now: Instant) {
        sessions.retain(|_, entry| entry.expires_at > now);
    }

    fn evict_oldest(sessions: &mut HashMap<String, SessionEntry>) {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            debug!("Session store full, evicting oldest session");
            sessions.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::types::ROLE_CUSTOMER;

    fn store(ttl_secs: u64, max_sessions: usize) -> SessionStore {
        SessionStore::new(&SessionConfig {
            ttl_secs,
            max_sessions,
            cookie_name: "TEST_SESSION".to_string(),
        })
    }

    fn customer() -> Principal {
        Principal::new("customer", vec![ROLE_CUSTOMER.to_string()])
    }

    #[test]
    fn create_and_resolve_round_trip() {
        let store = store(60, 16);
        let id = store.create(customer());
        let principal = store.resolve(&id).unwrap();
        assert_eq!(principal.username, "customer");
        assert!(principal.has_role(ROLE_CUSTOMER));
    }

    #[test]
    fn ids_are_unique_and_opaque() {
        let store = store(60, 16);
        let first = store.create(customer());
        let second = store.create(customer());
        assert_ne!(first, second);
        assert!(!first.contains("customer"));
    }

    #[test]
    fn unknown_id_resolves_to_nothing() {
        let store = store(60, 16);
        assert!(store.resolve("no-such-session").is_none());
    }

    #[test]
    fn expired_session_is_removed_on_resolve() {
        let store = store(0, 16);
        let id = store.create(customer());
        assert!(store.resolve(&id).is_none());
        assert_eq!(store.active_sessions(), 0);
    }

    #[test]
    fn destroy_is_idempotent() {
        let store = store(60, 16);
        let id = store.create(customer());
        store.destroy(&id);
        store.destroy(&id);
        assert!(store.resolve(&id).is_none());
    }

    #[test]
    fn capacity_is_bounded_by_eviction() {
        let store = store(60, 2);
        let first = store.create(customer());
        // Keep creation instants distinct so eviction order is deterministic.
        std::thread::sleep(Duration::from_millis(2));
        store.create(customer());
        std::thread::sleep(Duration::from_millis(2));
        store.create(customer());
        assert_eq!(store.active_sessions(), 2);
        assert!(store.resolve(&first).is_none());
    }
}
