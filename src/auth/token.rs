//! Signed session tokens
//!
//! Uses HMAC-signed tokens stored in cookies.
//! No server-side session storage needed, so a token stays valid until
//! it expires even after the client drops the cookie.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 output size
const SIGNATURE_LEN: usize = 32;

/// Why a token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not of the form `payload.signature`, or not decodable
    #[error("malformed session token")]
    Malformed,

    /// MAC does not match the payload
    #[error("session token signature mismatch")]
    SignatureMismatch,

    /// Signed by us, but for another cookie scheme
    #[error("session token issued for a different audience")]
    WrongAudience,

    /// Signed and well-formed, but past its expiry
    #[error("session token expired")]
    Expired,

    /// Lifetime must be positive
    #[error("session lifetime must be positive")]
    InvalidLifetime,

    /// HMAC key rejected
    #[error("invalid session signing key")]
    InvalidKey,
}

/// Claims carried in a session token
///
/// Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Scheme the token was minted for (its cookie name)
    pub aud: String,
    /// Principal
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Expires at
    pub exp: i64,
}

impl SessionClaims {
    /// Claims expiring `lifetime` after `now`
    ///
    /// # Errors
    /// `InvalidLifetime` unless `lifetime` is positive
    pub fn new(
        audience: &str,
        subject: &str,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenError> {
        if lifetime <= Duration::zero() {
            return Err(TokenError::InvalidLifetime);
        }

        let iat = now.timestamp();
        Ok(Self {
            aud: audience.to_owned(),
            sub: subject.to_owned(),
            iat,
            exp: iat.saturating_add(lifetime.num_seconds()),
        })
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Expired strictly after `exp`; a token is still valid at `exp` itself.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }
}

/// Creates and verifies tokens for one audience with one secret
pub struct SessionCodec {
    audience: String,
    secret: SecretString,
    lifetime: Duration,
}

impl fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCodec")
            .field("audience", &self.audience)
            .field("secret", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl SessionCodec {
    pub fn new(audience: impl Into<String>, secret: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            audience: audience.into(),
            secret: SecretString::from(secret.into()),
            lifetime,
        }
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Mint a token for `subject`, valid from `now` for the codec's lifetime
    pub fn create(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.issue(subject, now).map(|(token, _)| token)
    }

    /// Like [`SessionCodec::create`], also returning the signed claims
    pub fn issue(
        &self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, SessionClaims), TokenError> {
        let claims = SessionClaims::new(&self.audience, subject, now, self.lifetime)?;
        let token = seal(self.secret.expose_secret(), &claims)?;
        Ok((token, claims))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        verify_session_token(self.secret.expose_secret(), &self.audience, token, now)
    }
}

/// Create a signed session token
///
/// Token format: base64(payload).base64(hmac_sha256(base64(payload)))
///
/// Both halves are URL-safe base64 without padding, whose alphabet has no `.`.
pub fn create_session_token(
    secret: &str,
    audience: &str,
    subject: &str,
    now: DateTime<Utc>,
    lifetime: Duration,
) -> Result<String, TokenError> {
    let claims = SessionClaims::new(audience, subject, now, lifetime)?;
    seal(secret, &claims)
}

fn seal(secret: &str, claims: &SessionClaims) -> Result<String, TokenError> {
    let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
    let signature_b64 = URL_SAFE_NO_PAD.encode(sign(secret, &payload_b64)?);

    Ok(format!("{payload_b64}.{signature_b64}"))
}

/// Verify and decode a session token
///
/// The signature is checked before anything in the payload is trusted;
/// expiry is only read from a payload whose MAC matched.
pub fn verify_session_token(
    secret: &str,
    audience: &str,
    token: &str,
    now: DateTime<Utc>,
) -> Result<SessionClaims, TokenError> {
    // 1. Split token into payload and signature
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
    if payload_b64.is_empty() || signature_b64.contains('.') {
        return Err(TokenError::Malformed);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| TokenError::Malformed)?;
    if signature.len() != SIGNATURE_LEN {
        return Err(TokenError::Malformed);
    }

    // 2. Verify HMAC signature (constant time)
    let mut mac = new_mac(secret)?;
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::SignatureMismatch)?;

    // 3. Decode and deserialize payload
    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| TokenError::Malformed)?;
    let claims: SessionClaims =
        serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

    // 4. Audience, then expiry
    if claims.aud != audience {
        return Err(TokenError::WrongAudience);
    }
    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

fn sign(secret: &str, payload_b64: &str) -> Result<Vec<u8>, TokenError> {
    let mut mac = new_mac(secret)?;
    mac.update(payload_b64.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn new_mac(secret: &str) -> Result<HmacSha256, TokenError> {
    <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::InvalidKey)
}
