//! Admin API endpoints
//!
//! Login is public; every other route sits behind [`require_admin`].

use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, get, post},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use subtle::ConstantTimeEq;

use super::dto::{LoginRequest, SessionResponse};
use crate::AppState;
use crate::auth::{ADMIN_SUBJECT, AdminSession, require_admin};
use crate::data::{Registration, TournamentSettings};
use crate::error::AppError;
use crate::metrics::LOGIN_ATTEMPTS_TOTAL;

/// Create admin router
///
/// Routes:
/// - POST /api/admin/login - Exchange the admin password for a session cookie
/// - POST /api/admin/logout - Clear the session cookie
/// - GET /api/admin/session - Current session
/// - GET /api/admin/settings - Tournament settings
/// - PUT /api/admin/settings - Replace tournament settings
/// - GET /api/admin/registrations - List registrations
/// - DELETE /api/admin/registrations/:id - Remove a registration
pub fn admin_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/session", get(session_info))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/registrations", get(list_registrations))
        .route("/registrations/:id", delete(delete_registration))
        .layer(middleware::from_fn_with_state(state, require_admin));

    Router::new().route("/login", post(login)).merge(protected)
}

// =============================================================================
// Session
// =============================================================================

/// POST /api/admin/login
///
/// Sets the admin session cookie when the password matches.
/// No cookie is written on mismatch.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let Json(req) = payload?;
    let now = Utc::now();

    if !password_matches(&req.password, &state.config.auth.admin_password) {
        LOGIN_ATTEMPTS_TOTAL.with_label_values(&["rejected"]).inc();
        tracing::warn!("Admin login rejected");
        return Err(AppError::InvalidCredentials);
    }

    let (cookie, claims) = state.admin.issue(ADMIN_SUBJECT, now)?;
    LOGIN_ATTEMPTS_TOTAL.with_label_values(&["accepted"]).inc();
    tracing::info!(expires_at = %claims.expires_at(), "Admin logged in");

    Ok((jar.add(cookie), Json(SessionResponse::active(&claims))))
}

/// Constant-time comparison
fn password_matches(submitted: &str, expected: &str) -> bool {
    submitted.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// POST /api/admin/logout
///
/// Clears the cookie only; the token itself remains valid until it expires.
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    AdminSession(_session): AdminSession,
) -> (CookieJar, Json<SessionResponse>) {
    tracing::info!("Admin logged out");
    (jar.add(state.admin.clear()), Json(SessionResponse::ended()))
}

/// GET /api/admin/session
async fn session_info(AdminSession(session): AdminSession) -> Json<SessionResponse> {
    Json(SessionResponse::active(&session))
}

// =============================================================================
// Settings
// =============================================================================

/// GET /api/admin/settings
async fn get_settings(State(state): State<AppState>) -> Json<TournamentSettings> {
    Json(state.store.settings().await)
}

/// PUT /api/admin/settings
async fn update_settings(
    State(state): State<AppState>,
    payload: Result<Json<TournamentSettings>, JsonRejection>,
) -> Result<Json<TournamentSettings>, AppError> {
    let Json(settings) = payload?;
    let settings = state.store.replace_settings(settings).await?;
    tracing::info!(
        name = %settings.name,
        registration_open = settings.registration_open,
        "Tournament settings updated"
    );
    Ok(Json(settings))
}

// =============================================================================
// Registrations
// =============================================================================

/// GET /api/admin/registrations
async fn list_registrations(State(state): State<AppState>) -> Json<Vec<Registration>> {
    Json(state.store.registrations().await)
}

/// DELETE /api/admin/registrations/:id
async fn delete_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = state.store.remove_registration(&id).await?;
    tracing::info!(id = %removed.id, "Registration removed");
    Ok(StatusCode::NO_CONTENT)
}
