//! Authentication and authorization error taxonomy.
//!
//! Every way a request can be rejected before reaching business logic maps
//! to one variant here. Public messages are deliberately generic: all token
//! failures on the stateless path read the same to the caller, and an
//! unknown user is indistinguishable from a wrong password.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Reasons a request or credential check is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Username/password pair did not verify
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No such user. Internal only: [`AuthenticationService`] folds this
    /// into `InvalidCredentials` before it ever leaves the service, so the
    /// API never reveals whether a username exists.
    ///
    /// [`AuthenticationService`]: crate::security::auth_service::AuthenticationService
    #[error("user not found")]
    UserNotFound,

    /// No `Authorization: Bearer` header on a protected stateless path
    #[error("missing bearer token")]
    MissingToken,

    /// Token structure, encoding, or algorithm header is wrong
    #[error("malformed token")]
    MalformedToken,

    /// Token signature verified but the expiry time has passed
    #[error("token expired")]
    ExpiredToken,

    /// Recomputed signature did not match the presented one
    #[error("token signature invalid")]
    SignatureInvalid,

    /// Authenticated principal lacks the role required for the path
    #[error("insufficient role")]
    InsufficientRole,
}

impl AuthError {
    pub fn http_status_code(&self) -> StatusCode {
        match self {
            Self::InsufficientRole => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable code for programmatic error handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserNotFound => "INVALID_CREDENTIALS",
            Self::MissingToken => "MISSING_TOKEN",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::ExpiredToken => "TOKEN_EXPIRED",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials | Self::UserNotFound => "Invalid username or password.",
            Self::MissingToken
            | Self::MalformedToken
            | Self::ExpiredToken
            | Self::SignatureInvalid => {
                "Full authentication is required to access this resource."
            }
            Self::InsufficientRole => "Access is denied.",
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        self.http_status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.http_status_code()).json(serde_json::json!({
            "error": true,
            "error_code": self.error_code(),
            "message": self.public_message(),
        }))
    }
}
