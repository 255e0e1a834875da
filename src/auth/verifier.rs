//! Session verification from request cookies
//!
//! Pure function of the cookie header, the codec and `now`: no I/O.

use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::token::{SessionClaims, SessionCodec, TokenError};

/// Why a request carries no usable session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No session cookie; the normal logged-out state
    #[error("no session cookie")]
    Absent,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl AuthFailure {
    /// Stable label for logs and metrics
    pub fn reason(&self) -> &'static str {
        match self {
            AuthFailure::Absent => "absent",
            AuthFailure::Token(TokenError::Malformed) => "malformed",
            AuthFailure::Token(TokenError::SignatureMismatch) => "signature_mismatch",
            AuthFailure::Token(TokenError::WrongAudience) => "wrong_audience",
            AuthFailure::Token(TokenError::Expired) => "expired",
            AuthFailure::Token(TokenError::InvalidLifetime) => "invalid_lifetime",
            AuthFailure::Token(TokenError::InvalidKey) => "invalid_key",
        }
    }
}

/// Looks up one cookie and verifies it with one codec
#[derive(Debug, Clone, Copy)]
pub struct SessionVerifier<'a> {
    cookie_name: &'a str,
    codec: &'a SessionCodec,
}

impl<'a> SessionVerifier<'a> {
    pub fn new(cookie_name: &'a str, codec: &'a SessionCodec) -> Self {
        Self { cookie_name, codec }
    }

    /// Verify the session cookie in `jar`
    pub fn authenticate(
        &self,
        jar: &CookieJar,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, AuthFailure> {
        let cookie = jar.get(self.cookie_name).ok_or(AuthFailure::Absent)?;
        Ok(self.codec.verify(cookie.value(), now)?)
    }

    pub fn authenticate_headers(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, AuthFailure> {
        self.authenticate(&CookieJar::from_headers(headers), now)
    }

    pub fn is_authenticated(&self, jar: &CookieJar, now: DateTime<Utc>) -> bool {
        self.authenticate(jar, now).is_ok()
    }
}
