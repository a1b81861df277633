//! End-to-end bearer token flow: credentials in, token out, token gates the
//! API, and every failure class maps to its own stable error code.

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use bookshop::config::AppConfig;
use bookshop::security::policy::SecurityPolicyRouter;
use bookshop::security::token::TokenCodec;
use bookshop::security::types::Principal;
use bookshop::server::{configure_routes, AppState, SecurityMiddleware};
use serde_json::{json, Value};

const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.token.secret = TEST_SECRET.to_string();
    config
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .wrap(SecurityMiddleware::new(
                    SecurityPolicyRouter::storefront_defaults(),
                    $state.codec.clone(),
                    $state.sessions.clone(),
                ))
                .configure(configure_routes),
        )
        .await
    };
}

fn state() -> web::Data<AppState> {
    web::Data::new(AppState::from_config(&test_config()).unwrap())
}

macro_rules! issue_token {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/authenticate")
            .set_json(json!({"username": $username, "password": $password}))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

#[tokio::test]
async fn issued_token_opens_the_api() {
    let _ = env_logger::builder().is_test(true).try_init();
    let state = state();
    let app = test_app!(state);

    let token = issue_token!(app, "admin", "admin");

    let req = test::TestRequest::get()
        .uri("/api/books")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["requested_by"], "admin");
    assert!(!body["books"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn every_seeded_identity_round_trips_through_a_token() {
    let state = state();
    let app = test_app!(state);

    for username in ["customer", "employee", "admin"] {
        let token = issue_token!(app, username, username);
        let req = test::TestRequest::get()
            .uri("/api/books")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "user {}", username);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["requested_by"], username);
    }
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_indistinguishable() {
    let state = state();
    let app = test_app!(state);

    let mut bodies = Vec::new();
    for (username, password) in [("admin", "wrong"), ("nobody", "whatever")] {
        let req = test::TestRequest::post()
            .uri("/api/authenticate")
            .set_json(json!({"username": username, "password": password}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error_code"], "INVALID_CREDENTIALS");
        bodies.push(body);
    }
    // Same body either way, so responses never confirm a username.
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn tampered_token_is_rejected_as_signature_invalid() {
    let state = state();
    let app = test_app!(state);

    let token = issue_token!(app, "customer", "customer");
    let dot = token.rfind('.').unwrap();
    let mut tampered = token.into_bytes();
    tampered[dot + 1] = if tampered[dot + 1] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/books")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", tampered)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "SIGNATURE_INVALID");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let state = state();
    let app = test_app!(state);

    // Issued under the live secret but with a zero validity window.
    let stale_codec = TokenCodec::new(TEST_SECRET.as_bytes(), 0);
    let principal = Principal::new("admin", vec!["ROLE_ADMIN".to_string()]);
    let token = stale_codec.issue(&principal).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/books")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn garbage_token_is_rejected_as_malformed() {
    let state = state();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/books")
        .insert_header((header::AUTHORIZATION, "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "MALFORMED_TOKEN");
}

#[tokio::test]
async fn non_bearer_authorization_counts_as_missing() {
    let state = state();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/books")
        .insert_header((header::AUTHORIZATION, "Basic YWRtaW46YWRtaW4="))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error_code"], "MISSING_TOKEN");
}
