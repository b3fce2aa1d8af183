//! Upstream reachability probe.

use axum::http::StatusCode;
use reqwest::Client;
use std::time::Duration;

/// Outcome of a single probe against the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthProbe {
    /// Upstream answered 200.
    Connected,
    /// Upstream answered with any other status.
    ErrorStatus(StatusCode),
    /// No answer within the deadline.
    Timeout,
    /// Connection failed or the request could not be sent.
    Unreachable(String),
}

impl HealthProbe {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthProbe::Connected)
    }

    /// Value reported in the `tunnel` field of `/health`.
    ///
    /// Timeouts and connection failures are deliberately reported the same way.
    pub fn tunnel_state(&self) -> &'static str {
        match self {
            HealthProbe::Connected => "connected",
            HealthProbe::ErrorStatus(_) => "responding_with_error",
            HealthProbe::Timeout | HealthProbe::Unreachable(_) => "not_accessible",
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            HealthProbe::Connected => "connected",
            HealthProbe::ErrorStatus(_) => "error_status",
            HealthProbe::Timeout => "timeout",
            HealthProbe::Unreachable(_) => "unreachable",
        }
    }
}

/// GET `url` once and classify the result.
pub async fn probe(client: &Client, url: &str, timeout: Duration) -> HealthProbe {
    match client.get(url).timeout(timeout).send().await {
        Ok(response) if response.status() == StatusCode::OK => HealthProbe::Connected,
        Ok(response) => HealthProbe::ErrorStatus(response.status()),
        Err(e) if e.is_timeout() => HealthProbe::Timeout,
        Err(e) => HealthProbe::Unreachable(e.to_string()),
    }
}
