//! Common test utilities for E2E tests

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use reqwest::header::SET_COOKIE;
use tokio::net::TcpListener;
use tourney::{AppState, auth::ADMIN_SUBJECT, config};

pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

/// Local-development configuration (plain http, insecure cookies)
pub fn test_config() -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            domain: "localhost".to_string(),
            protocol: "http".to_string(),
        },
        auth: config::AuthConfig {
            admin_password: ADMIN_PASSWORD.to_string(),
            session_secret: "test-admin-secret-key-32-bytes-long!".to_string(),
            session_max_age: 86_400,
            cookie_name: "admin_session".to_string(),
        },
        visitor: config::VisitorConfig {
            session_secret: "test-visitor-secret-key-32-bytes-long".to_string(),
            session_max_age: 2_592_000,
            cookie_name: "tourney_user".to_string(),
        },
        tournament: config::TournamentConfig {
            name: "Test Cup".to_string(),
            registration_open: true,
            max_participants: None,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: config::AppConfig) -> Self {
        tourney::metrics::init_metrics();

        // Initialize app state
        let state = AppState::new(config).unwrap();

        // Create HTTP client; cookies are passed by hand
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = tourney::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Mint an admin token directly, as of `now`
    pub fn admin_token_at(&self, now: DateTime<Utc>) -> String {
        let (cookie, _) = self.state.admin.issue(ADMIN_SUBJECT, now).unwrap();
        cookie.value().to_string()
    }

    pub fn admin_token(&self) -> String {
        self.admin_token_at(Utc::now())
    }

    /// `Cookie` header value carrying an admin session
    pub fn admin_cookie(&self, token: &str) -> String {
        format!("{}={}", self.state.admin.cookie_name(), token)
    }

    /// Log in through the API and return the session token
    pub async fn login(&self) -> String {
        let response = self
            .client
            .post(self.url("/api/admin/login"))
            .json(&serde_json::json!({ "password": ADMIN_PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        set_cookie(&response, self.state.admin.cookie_name())
            .expect("login sets the admin cookie")
            .value()
            .to_string()
    }
}

/// Parse the `Set-Cookie` header for `name`
pub fn set_cookie(response: &reqwest::Response, name: &str) -> Option<cookie::Cookie<'static>> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| cookie::Cookie::parse(raw.to_string()).ok())
        .find(|cookie| cookie.name() == name)
}
