//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use std::fmt;
use std::net::IpAddr;

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub visitor: VisitorConfig,
    pub tournament: TournamentConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "cup.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://cup.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Admin authentication configuration
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Password accepted by the admin login
    pub admin_password: String,
    /// Session secret key (32+ bytes)
    pub session_secret: String,
    /// Session max age in seconds (default: 86400 = 24h)
    pub session_max_age: i64,
    /// Admin session cookie name (default: "admin_session")
    pub cookie_name: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("admin_password", &"[REDACTED]")
            .field("session_secret", &"[REDACTED]")
            .field("session_max_age", &self.session_max_age)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

/// Visitor identity cookie configuration
#[derive(Clone, Deserialize)]
pub struct VisitorConfig {
    /// Session secret key (32+ bytes), distinct from the admin one
    pub session_secret: String,
    /// Session max age in seconds (default: 2592000 = 30 days)
    pub session_max_age: i64,
    /// Visitor cookie name (default: "tourney_user")
    pub cookie_name: String,
}

impl fmt::Debug for VisitorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitorConfig")
            .field("session_secret", &"[REDACTED]")
            .field("session_max_age", &self.session_max_age)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

/// Initial tournament settings
#[derive(Debug, Clone, Deserialize)]
pub struct TournamentConfig {
    pub name: String,
    pub registration_open: bool,
    pub max_participants: Option<u32>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub fn default_filter(&self) -> String {
        let level = self.level.trim().to_ascii_lowercase();
        format!("tourney={level},tower_http={level}")
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (TOURNEY__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.domain", "localhost")?
            .set_default("server.protocol", "http")?
            .set_default("auth.session_max_age", 86400)?
            .set_default("auth.cookie_name", "admin_session")?
            .set_default("visitor.session_max_age", 2_592_000)?
            .set_default("visitor.cookie_name", "tourney_user")?
            .set_default("tournament.name", "Tournament")?
            .set_default("tournament.registration_open", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (TOURNEY__*)
            .add_source(
                Environment::with_prefix("TOURNEY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Production transport: https, or any non-local domain
    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.protocol.eq_ignore_ascii_case("https")
            || !is_local_server_domain(&self.server.domain)
    }

    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.admin_password.is_empty() {
            return Err(AppError::Config(
                "auth.admin_password must not be empty".to_string(),
            ));
        }

        for (key, secret) in [
            ("auth.session_secret", &self.auth.session_secret),
            ("visitor.session_secret", &self.visitor.session_secret),
        ] {
            if secret.len() < MIN_SESSION_SECRET_BYTES {
                return Err(AppError::Config(format!(
                    "{key} must be at least {MIN_SESSION_SECRET_BYTES} bytes"
                )));
            }
        }

        if self.auth.session_secret == self.visitor.session_secret {
            return Err(AppError::Config(
                "visitor.session_secret must differ from auth.session_secret".to_string(),
            ));
        }

        if self.auth.session_secret == self.auth.admin_password {
            return Err(AppError::Config(
                "auth.session_secret must differ from auth.admin_password".to_string(),
            ));
        }

        for (key, max_age) in [
            ("auth.session_max_age", self.auth.session_max_age),
            ("visitor.session_max_age", self.visitor.session_max_age),
        ] {
            if max_age <= 0 {
                return Err(AppError::Config(format!("{key} must be greater than 0")));
            }
        }

        if self.auth.cookie_name.is_empty() || self.visitor.cookie_name.is_empty() {
            return Err(AppError::Config("cookie names must not be empty".to_string()));
        }

        if self.auth.cookie_name == self.visitor.cookie_name {
            return Err(AppError::Config(
                "auth.cookie_name and visitor.cookie_name must differ".to_string(),
            ));
        }

        if self.logging.level.trim().parse::<tracing::Level>().is_err() {
            return Err(AppError::Config(format!(
                "logging.level must be one of trace, debug, info, warn, error (got {:?})",
                self.logging.level
            )));
        }

        if !self.should_use_secure_cookies() {
            let host = normalized_server_host(&self.server.domain);
            tracing::warn!(
                host = %host,
                protocol = %self.server.protocol,
                "Using insecure session cookies for local development"
            );
        } else if !self.server.protocol.eq_ignore_ascii_case("https") {
            return Err(AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}
