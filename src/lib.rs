//! Tourney - Tournament registration with signed-cookie admin sessions
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Admin endpoints (guarded by require_admin)               │
//! │  - Public tournament / registration endpoints               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Auth Layer                               │
//! │  - SessionScheme: token codec + cookie profile              │
//! │  - Admin and visitor schemes, stateless                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - In-memory settings and registrations                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `auth`: Session tokens, cookies and guards
//! - `data`: Tournament store
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request; everything in it is
/// read-only or internally synchronized.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Admin session scheme
    pub admin: Arc<auth::SessionScheme>,

    /// Visitor identity scheme
    pub visitor: Arc<auth::SessionScheme>,

    /// Tournament store
    pub store: Arc<data::Store>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        use chrono::Duration;

        config.validate()?;

        let secure = config.should_use_secure_cookies();
        let admin = auth::SessionScheme::new(
            "admin",
            &config.auth.cookie_name,
            &config.auth.session_secret,
            Duration::seconds(config.auth.session_max_age),
            secure,
        );
        let visitor = auth::SessionScheme::new(
            "visitor",
            &config.visitor.cookie_name,
            &config.visitor.session_secret,
            Duration::seconds(config.visitor.session_max_age),
            secure,
        );

        let store = data::Store::new(data::TournamentSettings {
            name: config.tournament.name.clone(),
            registration_open: config.tournament.registration_open,
            max_participants: config.tournament.max_participants,
        });

        tracing::info!(
            admin_cookie = %admin.cookie_name(),
            visitor_cookie = %visitor.cookie_name(),
            secure_cookies = secure,
            "Application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            admin: Arc::new(admin),
            visitor: Arc::new(visitor),
            store: Arc::new(store),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::trace::TraceLayer;

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest(
            "/api",
            api::public_router().nest("/admin", api::admin_router(state.clone())),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
    use tower_http::cors::CorsLayer;

    // Cookies need credentialed CORS, which rules out wildcards
    let allowed_origin = server.base_url();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([CONTENT_TYPE])
            .allow_credentials(true),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin from server base URL; denying cross-origin requests"
            );
            CorsLayer::new()
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
