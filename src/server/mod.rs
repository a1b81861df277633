//! HTTP layer: the server, its security gate, and the route handlers.

pub mod auth_routes;
pub mod http_server;
pub mod middleware;
pub mod principal;
pub mod session;
pub mod shop_routes;

pub use http_server::{configure_routes, AppState, BookshopHttpServer};
pub use middleware::SecurityMiddleware;
pub use principal::request_principal;
pub use session::SessionStore;
