//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry, core::Collector};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Auth Metrics
    pub static ref LOGIN_ATTEMPTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tourney_login_attempts_total", "Total number of admin login attempts"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref GUARD_DECISIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tourney_guard_decisions_total", "Total number of session guard decisions"),
        &["scheme", "verdict"]
    ).expect("metric can be created");

    // Registration Metrics
    pub static ref REGISTRATIONS_TOTAL: IntCounter = IntCounter::new(
        "tourney_registrations_total",
        "Total number of registrations created"
    ).expect("metric can be created");
    pub static ref REGISTRATIONS_ACTIVE: IntGauge = IntGauge::new(
        "tourney_registrations_active",
        "Current number of registrations"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("tourney_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

static INIT: Once = Once::new();

/// Register every instrument with [`REGISTRY`]
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() {
    INIT.call_once(|| {
        let collectors: [(&str, Box<dyn Collector>); 5] = [
            ("LOGIN_ATTEMPTS_TOTAL", Box::new(LOGIN_ATTEMPTS_TOTAL.clone())),
            ("GUARD_DECISIONS_TOTAL", Box::new(GUARD_DECISIONS_TOTAL.clone())),
            ("REGISTRATIONS_TOTAL", Box::new(REGISTRATIONS_TOTAL.clone())),
            ("REGISTRATIONS_ACTIVE", Box::new(REGISTRATIONS_ACTIVE.clone())),
            ("ERRORS_TOTAL", Box::new(ERRORS_TOTAL.clone())),
        ];
        for (name, collector) in collectors {
            if let Err(error) = REGISTRY.register(collector) {
                tracing::error!(metric = name, %error, "Failed to register metric");
            }
        }

        tracing::info!("Metrics registry initialized");
    });
}
