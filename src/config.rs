//! Configuration for the bookshop service.
//!
//! Configuration is read from an optional TOML file with environment
//! variable overrides for secret material. The HMAC signing secret is
//! process-wide and immutable for the process lifetime; it is validated at
//! startup and never logged.

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ShopError, ShopResult};

/// Environment variable supplying the HMAC signing secret.
pub const JWT_SECRET_ENV: &str = "BOOKSHOP_JWT_SECRET";

/// Minimum acceptable signing secret length in bytes (HMAC-SHA256 block input).
const MIN_SECRET_BYTES: usize = 32;

/// Main configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Bearer token settings
    #[serde(default)]
    pub token: TokenConfig,
    /// Web session settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Bearer token configuration
#[derive(Clone, Deserialize)]
pub struct TokenConfig {
    /// HMAC-SHA256 key material; usually supplied via `BOOKSHOP_JWT_SECRET`
    #[serde(default)]
    pub secret: String,
    /// Token validity window in seconds
    #[serde(default = "default_validity_secs")]
    pub validity_secs: u64,
}

/// Web session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session time-to-live in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of sessions held in memory
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_validity_secs() -> u64 {
    3600 // 1 hour
}

fn default_session_ttl_secs() -> u64 {
    1800 // 30 minutes
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_cookie_name() -> String {
    "BOOKSHOP_SESSION".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            token: TokenConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            validity_secs: default_validity_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl_secs(),
            max_sessions: default_max_sessions(),
            cookie_name: default_cookie_name(),
        }
    }
}

// The secret must never reach any log output.
impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("validity_secs", &self.validity_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> ShopResult<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)?;
                toml::from_str(&raw).map_err(|e| {
                    ShopError::Config(format!("Failed to parse {}: {}", path.display(), e))
                })?
            }
            None => Self::default(),
        };

        if let Ok(secret) = env::var(JWT_SECRET_ENV) {
            config.token.secret = secret;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration before the server starts.
    pub fn validate(&self) -> ShopResult<()> {
        if self.token.secret.len() < MIN_SECRET_BYTES {
            return Err(ShopError::Config(format!(
                "signing secret must be at least {} bytes; set {}",
                MIN_SECRET_BYTES, JWT_SECRET_ENV
            )));
        }
        if self.bind_address.is_empty() {
            return Err(ShopError::Config("bind_address must not be empty".to_string()));
        }
        if self.session.cookie_name.is_empty() {
            return Err(ShopError::Config(
                "session cookie_name must not be empty".to_string(),
            ));
        }
        if self.session.max_sessions == 0 {
            return Err(ShopError::Config(
                "session max_sessions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_secret() -> String {
        "0123456789abcdef0123456789abcdef".to_string()
    }

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.token.validity_secs, 3600);
        assert_eq!(config.session.cookie_name, "BOOKSHOP_SESSION");
    }

    #[test]
    fn rejects_short_secret() {
        let mut config = AppConfig::default();
        config.token.secret = "too-short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn accepts_valid_secret() {
        let mut config = AppConfig::default();
        config.token.secret = valid_secret();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookshop.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "bind_address = \"127.0.0.1:9000\"\n\n\
             [token]\nsecret = \"{}\"\nvalidity_secs = 600\n\n\
             [session]\nttl_secs = 60",
            valid_secret()
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.token.validity_secs, 600);
        assert_eq!(config.session.ttl_secs, 60);
        // Unset fields fall back to defaults
        assert_eq!(config.session.max_sessions, 10_000);
    }

    #[test]
    fn debug_never_prints_secret() {
        let mut config = AppConfig::default();
        config.token.secret = valid_secret();
        let printed = format!("{:?}", config);
        assert!(!printed.contains(&valid_secret()));
        assert!(printed.contains("<redacted>"));
    }
}
