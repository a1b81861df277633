//! # Bookshop
//!
//! Authentication and authorization service for a multi-entity storefront.
//!
//! The crate provides:
//! - Password authentication with Argon2 against an in-memory or sled-backed
//!   user store
//! - Issuance and verification of HMAC-SHA256 signed bearer tokens
//! - Mapping of token scope claims to role sets
//! - Two coexisting security policies applied per request path: a stateless
//!   bearer-token policy for the JSON API and a stateful session/form-login
//!   policy for server-rendered pages
//!
//! ## Architecture
//!
//! `security` holds the policy-independent building blocks (password hashing,
//! user stores, the token codec, the policy router). `server` wires them into
//! an actix-web application: a single [`server::SecurityMiddleware`] routes
//! every request to its policy and rejects it before any handler runs if it
//! is unauthenticated or under-authorized.

pub mod config;
pub mod error;
pub mod logging;
pub mod security;
pub mod server;

pub use config::AppConfig;
pub use error::{ShopError, ShopResult};
pub use security::auth_service::AuthenticationService;
pub use security::error::AuthError;
pub use security::password::PasswordHasher;
pub use security::policy::SecurityPolicyRouter;
pub use security::token::TokenCodec;
pub use security::types::{Credentials, Principal, User};
pub use security::user_store::{InMemoryUserStore, PersistentUserStore, UserStore};
pub use server::{AppState, BookshopHttpServer, SecurityMiddleware};
