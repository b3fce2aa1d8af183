//! `GET /health`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;

use crate::health::probe::{probe, HealthProbe};
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub tunnel: &'static str,
}

impl From<&HealthProbe> for HealthReport {
    fn from(outcome: &HealthProbe) -> Self {
        Self {
            status: if outcome.is_healthy() { "healthy" } else { "unhealthy" },
            tunnel: outcome.tunnel_state(),
        }
    }
}

/// Probe the current upstream and report 200 or 503.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let upstream = state.upstream.url();
    let timeout = Duration::from_secs(state.config.timeouts.health_secs);
    let outcome = probe(&state.client, &upstream, timeout).await;

    match &outcome {
        HealthProbe::Connected => tracing::debug!(upstream = %upstream, "Upstream healthy"),
        HealthProbe::ErrorStatus(status) => {
            tracing::warn!(upstream = %upstream, status = %status, "Health check failed: non-200 status")
        }
        HealthProbe::Timeout => tracing::warn!(upstream = %upstream, "Health check failed: timeout"),
        HealthProbe::Unreachable(error) => {
            tracing::warn!(upstream = %upstream, error = %error, "Health check failed: connection error")
        }
    }
    metrics::record_upstream_health(&outcome);

    let status = if outcome.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthReport::from(&outcome))).into_response()
}
