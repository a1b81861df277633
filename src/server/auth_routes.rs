//! Login endpoints: token issuance for API clients, form login for browsers.

use actix_web::{
    cookie::{Cookie, SameSite},
    http::header,
    web, Error, HttpRequest, HttpResponse,
};
use log::info;
use serde::{Deserialize, Serialize};

use crate::security::types::Credentials;
use crate::server::http_server::AppState;

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

/// POST /api/authenticate
///
/// Exchanges JSON credentials for a signed bearer token. Open to anonymous
/// callers; failures answer 401 with the standard error body.
pub async fn authenticate(
    state: web::Data<AppState>,
    credentials: web::Json<Credentials>,
) -> Result<HttpResponse, Error> {
    let principal = state
        .auth
        .authenticate(&credentials.username, &credentials.password)?;
    let token = state
        .codec
        .issue(&principal)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    info!("Issued token for {}", principal.username);
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[derive(Deserialize)]
pub struct LoginQuery {
    error: Option<String>,
    logout: Option<String>,
}

/// GET /login
///
/// Renders the login form. `?logout` ends the current session and confirms
/// it; `?error` shows a failure notice. Both render the form again.
pub async fn login_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<LoginQuery>,
) -> HttpResponse {
    let mut notice = "";
    if query.logout.is_some() {
        if let Some(cookie) = req.cookie(state.sessions.cookie_name()) {
            state.sessions.destroy(cookie.value());
        }
        notice = "<p>You have been signed out.</p>";
    } else if query.error.is_some() {
        notice = "<p>Invalid username or password.</p>";
    }

    let body = format!(
        "<!DOCTYPE html><html><head><title>Sign in</title></head><body>\
         <h1>Sign in</h1>{notice}\
         <form method=\"post\" action=\"/login\">\
         <label>Username <input type=\"text\" name=\"username\"></label>\
         <label>Password <input type=\"password\" name=\"password\"></label>\
         <button type=\"submit\">Sign in</button>\
         </form></body></html>"
    );

    let mut response = HttpResponse::Ok();
    response.content_type("text/html; charset=utf-8");
    if query.logout.is_some() {
        response.cookie(expired_session_cookie(state.sessions.cookie_name()));
    }
    response.body(body)
}

/// POST /login
///
/// Form login. Success establishes a session and lands on the home page;
/// failure bounces back to the form with an error notice. The response is a
/// redirect either way, so credentials never survive a page refresh.
pub async fn login_submit(
    state: web::Data<AppState>,
    form: web::Form<Credentials>,
) -> HttpResponse {
    match state.auth.authenticate(&form.username, &form.password) {
        Ok(principal) => {
            let session_id = state.sessions.create(principal);
            let cookie = Cookie::build(state.sessions.cookie_name().to_string(), session_id)
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .finish();
            HttpResponse::SeeOther()
                .insert_header((header::LOCATION, "/common/home"))
                .cookie(cookie)
                .finish()
        }
        Err(_) => HttpResponse::Found()
            .insert_header((header::LOCATION, "/login?error"))
            .finish(),
    }
}

fn expired_session_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_string(), "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}
