//! Forwarding failures and their HTTP mapping.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Connection refused, DNS failure or similar.
    #[error(
        "Upstream {upstream} is not accessible. Please ensure the local app is running and the tunnel is active."
    )]
    Unreachable { upstream: String },

    /// No response within the forwarding deadline.
    #[error("Request timeout. The upstream {upstream} is taking too long to respond.")]
    Timeout { upstream: String },

    /// Anything else, including unreadable inbound bodies.
    #[error("Proxy error: {0}")]
    Unexpected(String),
}

impl ProxyError {
    /// Classify an outbound client error against the upstream it targeted.
    ///
    /// Connection failures are checked first, so a connect timeout counts as
    /// unreachable.
    pub fn from_client(err: reqwest::Error, upstream: &str) -> Self {
        if err.is_connect() {
            ProxyError::Unreachable {
                upstream: upstream.to_string(),
            }
        } else if err.is_timeout() {
            ProxyError::Timeout {
                upstream: upstream.to_string(),
            }
        } else {
            ProxyError::Unexpected(err.to_string())
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Unreachable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
