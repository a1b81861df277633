//! Request authentication middleware.
//!
//! Every request is routed through the policy table before it reaches a
//! handler. Allowlisted endpoints pass untouched. Everything else is gated
//! by the mode of its governing policy: stateless paths present a bearer
//! token and are answered in JSON on failure, stateful paths present a
//! session cookie and are redirected to the login page when no session is
//! established. On success the verified [`Principal`] is attached to the
//! request for handlers to extract.

use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{header, StatusCode},
    Error, HttpMessage, HttpResponse, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use log::{debug, warn};

use crate::security::authority::roles_of;
use crate::security::error::AuthError;
use crate::security::policy::{PolicyMode, SecurityPolicyRouter};
use crate::security::token::TokenCodec;
use crate::security::types::Principal;
use crate::server::session::SessionStore;

/// Where an unauthenticated stateful request is sent.
pub const LOGIN_PATH: &str = "/login";

/// Shared state for the request gate.
struct SecurityCtx {
    router: SecurityPolicyRouter,
    codec: Arc<TokenCodec>,
    sessions: Arc<SessionStore>,
}

/// Actix transform installing the security gate on an app.
pub struct SecurityMiddleware {
    ctx: Rc<SecurityCtx>,
}

impl SecurityMiddleware {
    pub fn new(
        router: SecurityPolicyRouter,
        codec: Arc<TokenCodec>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            ctx: Rc::new(SecurityCtx {
                router,
                codec,
                sessions,
            }),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SecurityMiddlewareService<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(SecurityMiddlewareService {
            service: Rc::new(service),
            ctx: self.ctx.clone(),
        }))
    }
}

pub struct SecurityMiddlewareService<S> {
    service: Rc<S>,
    ctx: Rc<SecurityCtx>,
}

impl<S, B> Service<ServiceRequest> for SecurityMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let ctx = self.ctx.clone();

        Box::pin(async move {
            let policy = ctx.router.route(req.path());

            if policy.is_allowlisted(req.method().as_str(), req.path()) {
                debug!("{} {} is public under policy {}", req.method(), req.path(), policy.name());
                return forward(service, req).await;
            }

            let authenticated = match policy.mode() {
                PolicyMode::Stateless => bearer_principal(&ctx, &req),
                PolicyMode::Stateful => session_principal(&ctx, &req),
            };

            let principal = match authenticated {
                Ok(principal) => principal,
                Err(err) => {
                    warn!(
                        "Rejected {} {} under policy {}: {}",
                        req.method(),
                        req.path(),
                        policy.name(),
                        err
                    );
                    let response = match policy.mode() {
                        PolicyMode::Stateless => err.error_response(),
                        // No established session on a browser path: send the
                        // user to the login form instead of an error body.
                        PolicyMode::Stateful
                            if err.http_status_code() == StatusCode::UNAUTHORIZED =>
                        {
                            redirect_to_login()
                        }
                        PolicyMode::Stateful => err.error_response(),
                    };
                    return Ok(finish(req, response));
                }
            };

            let requirement = policy.required_roles(req.path());
            if !requirement.satisfied_by(&principal) {
                warn!(
                    "Denied {} access to {}: insufficient role",
                    principal.username,
                    req.path()
                );
                let response = AuthError::InsufficientRole.error_response();
                return Ok(finish(req, response));
            }

            debug!("Authenticated {} for {} {}", principal.username, req.method(), req.path());
            req.extensions_mut().insert(principal);
            forward(service, req).await
        })
    }
}

async fn forward<S, B>(
    service: Rc<S>,
    req: ServiceRequest,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
{
    service.call(req).await.map(|res| res.map_into_left_body())
}

/// Answer the request with `response` instead of calling the inner service.
fn finish<B>(
    req: ServiceRequest,
    response: HttpResponse,
) -> ServiceResponse<EitherBody<B>> {
    let (request, _payload) = req.into_parts();
    ServiceResponse::new(request, response).map_into_right_body()
}

fn redirect_to_login() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, LOGIN_PATH))
        .finish()
}

/// Authenticate a stateless request from its `Authorization` header.
fn bearer_principal(ctx: &SecurityCtx, req: &ServiceRequest) -> Result<Principal, AuthError> {
    let token = bearer_token(req).ok_or(AuthError::MissingToken)?;
    let claims = ctx.codec.verify(token)?;
    Ok(Principal::new(claims.sub.clone(), roles_of(&claims)))
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Authenticate a stateful request from its session cookie.
fn session_principal(ctx: &SecurityCtx, req: &ServiceRequest) -> Result<Principal, AuthError> {
    let cookie = req
        .cookie(ctx.sessions.cookie_name())
        .ok_or(AuthError::MissingToken)?;
    ctx.sessions
        .resolve(cookie.value())
        .ok_or(AuthError::ExpiredToken)
}
