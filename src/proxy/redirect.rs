//! Redirect-only forwarding (redirect mode).
//!
//! The caller's client performs the follow-up request against the upstream
//! itself, so nothing here touches the network.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::config::ProxyMode;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::upstream::build_target_url;

/// Catch-all handler: answer with `302 Found` pointing at the upstream.
pub async fn redirect_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let upstream = state.upstream.url();
    let location = redirect_location(&upstream, &uri);

    tracing::info!(
        request_id = %request_id(&headers),
        method = %method,
        path = %uri.path(),
        location = %location,
        "Redirecting request"
    );

    let response = match HeaderValue::try_from(location.as_str()) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(e) => {
            tracing::error!(upstream = %upstream, error = %e, "Upstream URL is not a valid Location");
            ProxyError::Unexpected(format!("invalid redirect location '{}': {}", location, e))
                .into_response()
        }
    };

    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        ProxyMode::Redirect,
        start_time,
    );
    response
}

/// The bare root (no query) goes to the upstream URL exactly as configured;
/// everything else gets the path and query appended.
fn redirect_location(upstream: &str, uri: &Uri) -> String {
    if uri.path() == "/" && uri.query().is_none() {
        upstream.to_string()
    } else {
        build_target_url(upstream, uri.path(), uri.query())
    }
}
