//! Public tournament endpoints
//!
//! Registering sets the visitor identity cookie; no admin session involved.

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use super::dto::TournamentView;
use crate::AppState;
use crate::auth::{CurrentVisitor, MaybeVisitor};
use crate::data::{NewRegistration, Registration};
use crate::error::AppError;

/// Create public router
///
/// Routes:
/// - GET /api/tournament - Public tournament info
/// - POST /api/registrations - Register and receive a visitor cookie
/// - GET /api/me - The caller's registration
/// - DELETE /api/me - Forget the visitor cookie
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/tournament", get(tournament))
        .route("/registrations", post(register))
        .route("/me", get(me).delete(forget_me))
}

/// GET /api/tournament
async fn tournament(
    State(state): State<AppState>,
    MaybeVisitor(visitor): MaybeVisitor,
) -> Json<TournamentView> {
    let settings = state.store.settings().await;
    let registered = match visitor {
        Some(claims) => state.store.registration(&claims.sub).await.is_some(),
        None => false,
    };

    Json(TournamentView {
        name: settings.name,
        registration_open: settings.registration_open,
        max_participants: settings.max_participants,
        participants: state.store.count().await,
        registered,
    })
}

/// POST /api/registrations
async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<NewRegistration>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<Registration>), AppError> {
    let Json(req) = payload?;
    let now = Utc::now();
    let registration = state.store.register(req, now).await?;
    let (cookie, _) = state.visitor.issue(&registration.id, now)?;

    tracing::info!(id = %registration.id, "Registration created");

    Ok((StatusCode::CREATED, jar.add(cookie), Json(registration)))
}

/// GET /api/me
async fn me(
    State(state): State<AppState>,
    CurrentVisitor(visitor): CurrentVisitor,
) -> Result<Json<Registration>, AppError> {
    state
        .store
        .registration(&visitor.sub)
        .await
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// DELETE /api/me
async fn forget_me(State(state): State<AppState>, jar: CookieJar) -> (StatusCode, CookieJar) {
    (StatusCode::NO_CONTENT, jar.add(state.visitor.clear()))
}
