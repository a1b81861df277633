//! Handler-side access to the authenticated principal.

use actix_web::{dev::Payload, Error, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::security::error::AuthError;
use crate::security::types::Principal;

/// The principal the security gate attached to this request, if any.
pub fn request_principal(req: &HttpRequest) -> Option<Principal> {
    req.extensions().get::<Principal>().cloned()
}

/// Extractor: handlers taking a `Principal` argument receive the identity
/// verified by the security gate. Paths the gate allowlists carry no
/// principal, so such handlers must not be mounted on them.
impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(request_principal(req).ok_or_else(|| AuthError::MissingToken.into()))
    }
}
