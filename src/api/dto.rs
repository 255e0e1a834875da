//! Request and response bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// POST /api/admin/login body
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Admin session state
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionResponse {
    pub fn active(claims: &crate::auth::SessionClaims) -> Self {
        Self {
            authenticated: true,
            issued_at: Some(claims.issued_at()),
            expires_at: Some(claims.expires_at()),
        }
    }

    pub fn ended() -> Self {
        Self {
            authenticated: false,
            issued_at: None,
            expires_at: None,
        }
    }
}

/// Public view of the tournament
#[derive(Debug, Serialize, Deserialize)]
pub struct TournamentView {
    pub name: String,
    pub registration_open: bool,
    pub max_participants: Option<u32>,
    pub participants: usize,
    /// Whether the caller's visitor cookie points at a live registration
    pub registered: bool,
}
