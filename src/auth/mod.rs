//! Session authentication
//!
//! Handles:
//! - Signed, expiring session tokens
//! - Session cookie attributes
//! - Request guards for admin and visitor sessions

mod cookies;
mod guard;
pub mod token;
mod verifier;

pub use cookies::{CookieAttributes, CookieProfile};
pub use guard::{
    ADMIN_SUBJECT, AdminSession, CurrentVisitor, MaybeVisitor, SessionScheme, require_admin,
};
pub use token::{
    SessionClaims, SessionCodec, TokenError, create_session_token, verify_session_token,
};
pub use verifier::{AuthFailure, SessionVerifier};
