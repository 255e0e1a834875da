//! `/metrics` scrape endpoint

use anyhow::Context;
use axum::{Router, http::header::CONTENT_TYPE, response::IntoResponse, routing::get};
use prometheus::{Encoder, TEXT_FORMAT, TextEncoder};

use crate::error::AppError;
use crate::metrics::REGISTRY;

/// Router serving the registry in the Prometheus text format
///
/// Stateless, so it can be merged after `with_state`.
pub fn metrics_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(scrape))
}

/// GET /metrics
///
/// Encoding failures surface as a plain 500 through [`AppError`].
async fn scrape() -> Result<impl IntoResponse, AppError> {
    let text = TextEncoder::new()
        .encode_to_string(&REGISTRY.gather())
        .context("encoding metrics")?;

    Ok(([(CONTENT_TYPE, TEXT_FORMAT)], text))
}
