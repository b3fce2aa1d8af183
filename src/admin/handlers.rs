use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::ProxyMode;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Serialize)]
pub struct TunnelUpdateResponse {
    pub status: &'static str,
    pub message: String,
    pub old_url: String,
    pub new_url: String,
    pub updated_at: DateTime<Utc>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub proxy_status: &'static str,
    pub version: &'static str,
    pub mode: ProxyMode,
    pub original_tunnel_url: String,
    pub current_tunnel_url: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_update_source: Option<String>,
    pub port: u16,
    pub environment: String,
}

/// Why a control request was refused.
#[derive(Debug)]
enum UpdateRejection {
    /// 400: `tunnel_url` missing or unusable.
    BadRequest(String),
    /// 500: the body could not be processed at all.
    Failed(String),
}

impl IntoResponse for UpdateRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            UpdateRejection::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            UpdateRejection::Failed(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorResponse { status: "error", message })).into_response()
    }
}

/// Fields pulled from a `/tunnel_update` body.
#[derive(Debug, PartialEq)]
struct TunnelUpdate {
    tunnel_url: String,
    source: String,
    timestamp: Option<Value>,
}

fn parse_update(body: &[u8]) -> Result<TunnelUpdate, UpdateRejection> {
    let data: Value = serde_json::from_slice(body)
        .map_err(|e| UpdateRejection::Failed(format!("Failed to parse request body: {}", e)))?;

    let tunnel_url = match data.get("tunnel_url") {
        None | Some(Value::Null) => {
            return Err(UpdateRejection::BadRequest("tunnel_url is required".into()))
        }
        Some(Value::String(url)) if !url.trim().is_empty() => url.clone(),
        Some(_) => {
            return Err(UpdateRejection::BadRequest(
                "tunnel_url must be a non-empty string".into(),
            ))
        }
    };

    let source = match data.get("source") {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(Value::String(source)) => source.clone(),
        Some(other) => other.to_string(),
    };

    Ok(TunnelUpdate {
        tunnel_url,
        source,
        timestamp: data.get("timestamp").cloned(),
    })
}

/// Buffer the control body; an oversized or broken body is a processing failure.
async fn read_update_body(request: Request, limit: usize) -> Result<Vec<u8>, UpdateRejection> {
    axum::body::to_bytes(request.into_body(), limit)
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| UpdateRejection::Failed(format!("Failed to read request body: {}", e)))
}

/// `POST /tunnel_update`: replace the upstream URL.
pub async fn update_tunnel(State(state): State<AppState>, request: Request) -> Response {
    let limit = state.config.limits.max_body_size;
    let update = match read_update_body(request, limit)
        .await
        .and_then(|body| parse_update(&body))
    {
        Ok(update) => update,
        Err(rejection) => {
            tracing::warn!(rejection = ?rejection, "Rejected tunnel update");
            return rejection.into_response();
        }
    };

    let swap = state
        .upstream
        .update(update.tunnel_url, Some(update.source.clone()));
    let updated_at = swap.current.updated_at.unwrap_or_else(Utc::now);

    tracing::info!(
        old_url = %swap.previous.url,
        new_url = %swap.current.url,
        source = %update.source,
        "Tunnel URL updated"
    );
    metrics::record_upstream_update(&update.source);

    Json(TunnelUpdateResponse {
        status: "success",
        message: "Tunnel URL updated successfully".to_string(),
        old_url: swap.previous.url.clone(),
        new_url: swap.current.url.clone(),
        updated_at,
        source: update.source,
        timestamp: update.timestamp,
    })
    .into_response()
}

/// `GET /status`: configuration snapshot.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusReport> {
    let current = state.upstream.load();

    Json(StatusReport {
        proxy_status: "running",
        version: env!("CARGO_PKG_VERSION"),
        mode: state.config.mode,
        original_tunnel_url: state.upstream.original().to_string(),
        current_tunnel_url: current.url.clone(),
        last_updated: current.updated_at,
        last_update_source: current.source.clone(),
        port: state.config.listener.port,
        environment: state.config.environment.clone(),
    })
}
