use thiserror::Error;

/// Result type alias for crate-level operations.
pub type ShopResult<T> = Result<T, ShopError>;

/// Unified error type for startup and infrastructure failures.
///
/// Authentication and authorization outcomes are not represented here; they
/// have their own taxonomy in [`crate::security::error::AuthError`] so that
/// request rejection never gets conflated with operational faults.
#[derive(Error, Debug)]
pub enum ShopError {
    /// Errors related to configuration loading and validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to the persistent user store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors related to password hashing
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Errors related to IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sled::Error> for ShopError {
    fn from(err: sled::Error) -> Self {
        ShopError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Serialization(err.to_string())
    }
}
