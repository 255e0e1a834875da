//! Request guards
//!
//! Protects routes that require a session. A [`SessionScheme`] bundles the
//! codec and cookie profile for one cookie family; the admin and visitor
//! sessions are two instances of it.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, Request, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::Cookie;
use chrono::{DateTime, Duration, Utc};

use super::cookies::CookieProfile;
use super::token::{SessionClaims, SessionCodec, TokenError};
use super::verifier::{AuthFailure, SessionVerifier};
use crate::AppState;
use crate::error::AppError;
use crate::metrics::GUARD_DECISIONS_TOTAL;

/// Principal recorded in admin sessions
pub const ADMIN_SUBJECT: &str = "admin";

/// Token codec and cookie profile for one cookie family
#[derive(Debug)]
pub struct SessionScheme {
    label: &'static str,
    codec: SessionCodec,
    profile: CookieProfile,
}

impl SessionScheme {
    /// # Arguments
    /// * `label` - Name used in logs and metrics ("admin", "visitor")
    /// * `cookie_name` - Cookie name, also the token audience
    /// * `secret` - HMAC secret key
    /// * `lifetime` - Token lifetime and cookie Max-Age
    /// * `secure` - Set the `Secure` flag
    pub fn new(
        label: &'static str,
        cookie_name: &str,
        secret: &str,
        lifetime: Duration,
        secure: bool,
    ) -> Self {
        Self {
            label,
            codec: SessionCodec::new(cookie_name, secret, lifetime),
            profile: CookieProfile::new(cookie_name, lifetime, secure),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn cookie_name(&self) -> &str {
        self.profile.name()
    }

    pub fn profile(&self) -> &CookieProfile {
        &self.profile
    }

    pub fn lifetime(&self) -> Duration {
        self.codec.lifetime()
    }

    pub fn verifier(&self) -> SessionVerifier<'_> {
        SessionVerifier::new(self.profile.name(), &self.codec)
    }

    /// Mint a session for `subject` and wrap it in the set-cookie attributes
    pub fn issue(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<(Cookie<'static>, SessionClaims), AppError> {
        let (token, claims) = self
            .codec
            .issue(subject, now)
            .map_err(|e| AppError::Config(e.to_string()))?;
        Ok((self.profile.set_attributes().into_cookie(token), claims))
    }

    /// Cookie that deletes the session on the client
    pub fn clear(&self) -> Cookie<'static> {
        self.profile.clear_attributes().into_cookie("")
    }

    pub fn verify(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, AuthFailure> {
        self.verifier().authenticate_headers(headers, now)
    }

    /// Allow or deny a request
    ///
    /// Every failure becomes [`AppError::Unauthorized`]; the kind only
    /// reaches logs and metrics. Never writes cookies.
    pub async fn guard(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, AppError> {
        match self.verify(headers, now) {
            Ok(claims) => {
                GUARD_DECISIONS_TOTAL
                    .with_label_values(&[self.label, "allow"])
                    .inc();
                Ok(claims)
            }
            Err(failure) => {
                self.log_denial(failure);
                GUARD_DECISIONS_TOTAL
                    .with_label_values(&[self.label, failure.reason()])
                    .inc();
                Err(AppError::Unauthorized)
            }
        }
    }

    fn log_denial(&self, failure: AuthFailure) {
        let scheme = self.label;
        let reason = failure.reason();
        match failure {
            AuthFailure::Absent => {
                tracing::trace!(scheme, "No session cookie");
            }
            AuthFailure::Token(TokenError::SignatureMismatch | TokenError::WrongAudience) => {
                tracing::warn!(scheme, reason, "Rejected forged or foreign session token");
            }
            AuthFailure::Token(_) => {
                tracing::debug!(scheme, reason, "Rejected session token");
            }
        }
    }
}

/// Middleware to require an admin session
///
/// Runs before the handler and adds [`AdminSession`] to request extensions.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/api/admin/...", ...)
///     .layer(middleware::from_fn_with_state(state, require_admin));
/// ```
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = state.admin.guard(request.headers(), Utc::now()).await?;

    request.extensions_mut().insert(AdminSession(claims));

    Ok(next.run(request).await)
}

/// Extractor for the authenticated admin session
///
/// Reuses the session placed by [`require_admin`] when present.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AdminSession>().cloned() {
            return Ok(session);
        }

        let state = AppState::from_ref(state);
        let claims = state.admin.guard(&parts.headers, Utc::now()).await?;
        let session = AdminSession(claims);
        parts.extensions.insert(session.clone());

        Ok(session)
    }
}

/// Extractor for the visitor identity cookie
#[derive(Debug, Clone)]
pub struct CurrentVisitor(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentVisitor
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let claims = state.visitor.guard(&parts.headers, Utc::now()).await?;

        Ok(CurrentVisitor(claims))
    }
}

/// Optional visitor extractor
///
/// Returns None if not identified, instead of error.
#[derive(Debug, Clone)]
pub struct MaybeVisitor(pub Option<SessionClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeVisitor
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let claims = state.visitor.guard(&parts.headers, Utc::now()).await.ok();

        Ok(MaybeVisitor(claims))
    }
}
