//! API layer
//!
//! HTTP handlers for:
//! - Admin API (session-guarded)
//! - Public tournament API
//! - Metrics (Prometheus)

mod admin;
mod dto;
pub mod metrics;
mod public;

pub use dto::*;

pub use admin::admin_router;
pub use metrics::metrics_router;
pub use public::public_router;
