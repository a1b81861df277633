//! Policy-independent authentication building blocks.
//!
//! Everything in this module is free of HTTP concerns except for the status
//! code mapping on [`error::AuthError`]: password hashing, user stores,
//! credential authentication, the token codec, role extraction, and the
//! ordered policy table that decides which security mode governs a request
//! path.

pub mod auth_service;
pub mod authority;
pub mod error;
pub mod password;
pub mod policy;
pub mod token;
pub mod types;
pub mod user_store;

pub use auth_service::AuthenticationService;
pub use authority::roles_of;
pub use error::AuthError;
pub use password::PasswordHasher;
pub use policy::{PolicyMode, RoleRequirement, SecurityPolicy, SecurityPolicyRouter};
pub use token::{Claims, TokenCodec};
pub use types::{Credentials, Principal, Role, User};
pub use user_store::{InMemoryUserStore, PersistentUserStore, UserStore};
