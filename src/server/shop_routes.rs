//! Storefront pages and sample API resources.
//!
//! The catalog here is a fixed in-memory sample; the interesting part is
//! which gate each route sits behind, not the data.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::security::types::Principal;
use crate::server::principal::request_principal;

#[derive(Serialize)]
struct Book {
    id: u32,
    title: String,
    author: String,
}

fn catalog() -> Vec<Book> {
    vec![
        Book {
            id: 1,
            title: "The Rust Programming Language".to_string(),
            author: "Steve Klabnik and Carol Nichols".to_string(),
        },
        Book {
            id: 2,
            title: "Programming Rust".to_string(),
            author: "Jim Blandy, Jason Orendorff, and Leonora Tindall".to_string(),
        },
        Book {
            id: 3,
            title: "Rust for Rustaceans".to_string(),
            author: "Jon Gjengset".to_string(),
        },
    ]
}

/// GET / — public landing page.
pub async fn index() -> HttpResponse {
    html_page(
        "Bookshop",
        "<h1>Bookshop</h1>\
         <p><a href=\"/login\">Sign in</a> or browse \
         <a href=\"/api/book-reviews/1\">book reviews</a>.</p>",
    )
}

/// GET /common/home — public home page; greets the user when a session
/// exists but requires none.
pub async fn common_home(req: HttpRequest) -> HttpResponse {
    let greeting = match request_principal(&req) {
        Some(principal) => format!("<p>Welcome back, {}.</p>", principal.username),
        None => "<p>Welcome to the bookshop.</p>".to_string(),
    };
    html_page("Home", &format!("<h1>Home</h1>{greeting}"))
}

/// GET /api/books — bearer-protected; returns the catalog with the caller's
/// verified identity.
pub async fn list_books(principal: Principal) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "requested_by": principal.username,
        "books": catalog(),
    }))
}

/// GET /api/book-reviews/{id} — anonymous sample read endpoint.
pub async fn get_book_review(path: web::Path<u32>) -> HttpResponse {
    let id = path.into_inner();
    let review = match id {
        1 => Some("A thorough introduction, worth every page."),
        2 => Some("Deep and practical; the ownership chapters shine."),
        3 => Some("The book to read once the basics have settled."),
        _ => None,
    };
    match review {
        Some(text) => HttpResponse::Ok().json(json!({ "book_id": id, "review": text })),
        None => HttpResponse::NotFound().json(json!({
            "error": true,
            "error_code": "REVIEW_NOT_FOUND",
            "message": format!("No review for book {}", id),
        })),
    }
}

/// GET /admin/dashboard — administrators only.
pub async fn admin_dashboard(principal: Principal) -> HttpResponse {
    html_page(
        "Administration",
        &format!(
            "<h1>Administration</h1><p>Signed in as {}.</p>",
            principal.username
        ),
    )
}

/// GET /user/home — any signed-in storefront role.
pub async fn user_home(principal: Principal) -> HttpResponse {
    html_page(
        "Your account",
        &format!("<h1>Your account</h1><p>Hello, {}.</p>", principal.username),
    )
}

fn html_page(title: &str, body: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<!DOCTYPE html><html><head><title>{title}</title></head><body>{body}</body></html>"
        ))
}
