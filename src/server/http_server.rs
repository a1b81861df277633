//! The bookshop HTTP server.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer as ActixHttpServer};
use log::info;

use crate::config::AppConfig;
use crate::error::{ShopError, ShopResult};
use crate::security::auth_service::AuthenticationService;
use crate::security::password::PasswordHasher;
use crate::security::policy::SecurityPolicyRouter;
use crate::security::token::TokenCodec;
use crate::security::user_store::{InMemoryUserStore, UserStore};
use crate::server::middleware::SecurityMiddleware;
use crate::server::session::SessionStore;
use crate::server::{auth_routes, shop_routes};

/// Shared application state for the HTTP server.
pub struct AppState {
    /// Credential verification against the user store
    pub auth: AuthenticationService,
    /// Bearer token issuance and verification
    pub codec: Arc<TokenCodec>,
    /// Web session store
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Build state with the seeded in-memory user store.
    pub fn from_config(config: &AppConfig) -> ShopResult<Self> {
        let hasher = PasswordHasher::new();
        let store = Arc::new(InMemoryUserStore::seeded(&hasher)?);
        Self::with_store(store, config)
    }

    /// Build state over any user store, persistent ones included.
    pub fn with_store(store: Arc<dyn UserStore>, config: &AppConfig) -> ShopResult<Self> {
        Ok(Self {
            auth: AuthenticationService::new(store, PasswordHasher::new())?,
            codec: Arc::new(TokenCodec::new(
                config.token.secret.as_bytes(),
                config.token.validity_secs,
            )),
            sessions: Arc::new(SessionStore::new(&config.session)),
        })
    }
}

/// Mounts every route. Shared between the server and the integration tests
/// so both run the exact same app.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(shop_routes::index))
        .route("/login", web::get().to(auth_routes::login_form))
        .route("/login", web::post().to(auth_routes::login_submit))
        .route("/common/home", web::get().to(shop_routes::common_home))
        .route("/admin/dashboard", web::get().to(shop_routes::admin_dashboard))
        .route("/user/home", web::get().to(shop_routes::user_home))
        .service(
            web::scope("/api")
                .route("/authenticate", web::post().to(auth_routes::authenticate))
                .route("/books", web::get().to(shop_routes::list_books))
                .route(
                    "/book-reviews/{id}",
                    web::get().to(shop_routes::get_book_review),
                ),
        );
}

/// HTTP server for the bookshop.
///
/// Serves the web storefront and the JSON API behind a single security gate:
/// every request passes through [`SecurityMiddleware`] before any handler
/// runs.
pub struct BookshopHttpServer {
    state: web::Data<AppState>,
    bind_address: String,
}

impl BookshopHttpServer {
    pub fn new(config: &AppConfig) -> ShopResult<Self> {
        Ok(Self {
            state: web::Data::new(AppState::from_config(config)?),
            bind_address: config.bind_address.clone(),
        })
    }

    /// Run the HTTP server until it is shut down.
    pub async fn run(&self) -> ShopResult<()> {
        info!("HTTP server running on {}", self.bind_address);

        let app_state = self.state.clone();
        let server = ActixHttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .app_data(app_state.clone())
                .wrap(SecurityMiddleware::new(
                    SecurityPolicyRouter::storefront_defaults(),
                    app_state.codec.clone(),
                    app_state.sessions.clone(),
                ))
                // Registered after the gate so preflight requests are
                // answered before authentication applies.
                .wrap(cors)
                .configure(configure_routes)
        })
        .bind(&self.bind_address)
        .map_err(|e| {
            ShopError::Config(format!("Failed to bind to {}: {}", self.bind_address, e))
        })?;

        server
            .run()
            .await
            .map_err(|e| ShopError::Config(format!("HTTP server error: {}", e)))
    }
}
