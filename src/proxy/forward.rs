//! Full request forwarding (proxy mode).

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, State},
    http::{HeaderMap, Method, Request},
    response::{IntoResponse, Response},
};
use reqwest::{multipart, Client, RequestBuilder};
use std::time::{Duration, Instant};

use crate::config::ProxyMode;
use crate::http::request::{forwarded_headers, request_id, ForwardKind};
use crate::http::response::relay;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::upstream::build_target_url;

/// Catch-all handler: forward the request and relay the upstream response.
pub async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // Pin the upstream for the whole call; a concurrent update only affects
    // later requests.
    let upstream = state.upstream.url();
    let target = build_target_url(&upstream, &path, request.uri().query());

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        target = %target,
        "Proxying request"
    );

    let response = match forward(&state, &upstream, &target, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                upstream = %upstream,
                error = %e,
                "Forwarding failed"
            );
            e.into_response()
        }
    };

    tracing::debug!(
        request_id = %request_id,
        status = %response.status(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request complete"
    );
    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        ProxyMode::Proxy,
        start_time,
    );

    response
}

async fn forward(
    state: &AppState,
    upstream: &str,
    target: &str,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let kind = ForwardKind::classify(request.method(), request.headers());
    let headers = forwarded_headers(request.headers(), &kind);
    let limit = state.config.limits.max_body_size;
    let client = &state.client;

    let outbound = match kind {
        ForwardKind::Get => without_body(client, Method::GET, target, headers),
        ForwardKind::PostJson => {
            let body = read_body(request, limit).await?;
            json_post(client, target, headers, &body)?
        }
        ForwardKind::PostMultipart => {
            let form = read_multipart(request).await?;
            multipart_post(client, target, headers, form)
        }
        ForwardKind::PostRaw => {
            let body = read_body(request, limit).await?;
            with_raw_body(client, Method::POST, target, headers, body)
        }
        ForwardKind::Put => {
            let body = read_body(request, limit).await?;
            with_raw_body(client, Method::PUT, target, headers, body)
        }
        ForwardKind::Delete => without_body(client, Method::DELETE, target, headers),
        ForwardKind::Other(method) => {
            let body = read_body(request, limit).await?;
            with_raw_body(client, method, target, headers, body)
        }
    };

    let response = outbound
        .timeout(Duration::from_secs(state.config.timeouts.forward_secs))
        .send()
        .await
        .map_err(|e| ProxyError::from_client(e, upstream))?;

    relay(response)
        .await
        .map_err(|e| ProxyError::from_client(e, upstream))
}

fn without_body(client: &Client, method: Method, target: &str, headers: HeaderMap) -> RequestBuilder {
    client.request(method, target).headers(headers)
}

fn with_raw_body(
    client: &Client,
    method: Method,
    target: &str,
    headers: HeaderMap,
    body: Bytes,
) -> RequestBuilder {
    client.request(method, target).headers(headers).body(body)
}

fn json_post(
    client: &Client,
    target: &str,
    headers: HeaderMap,
    body: &[u8],
) -> Result<RequestBuilder, ProxyError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ProxyError::Unexpected(format!("invalid JSON body: {}", e)))?;
    Ok(client.post(target).headers(headers).json(&value))
}

fn multipart_post(
    client: &Client,
    target: &str,
    headers: HeaderMap,
    form: multipart::Form,
) -> RequestBuilder {
    client.post(target).headers(headers).multipart(form)
}

async fn read_body(request: Request<Body>, limit: usize) -> Result<Bytes, ProxyError> {
    axum::body::to_bytes(request.into_body(), limit)
        .await
        .map_err(|e| ProxyError::Unexpected(format!("failed to read request body: {}", e)))
}

/// Re-encode every inbound form field and file part into an outbound form.
async fn read_multipart(request: Request<Body>) -> Result<multipart::Form, ProxyError> {
    let mut inbound = Multipart::from_request(request, &())
        .await
        .map_err(|e| ProxyError::Unexpected(format!("invalid multipart body: {}", e)))?;

    let mut form = multipart::Form::new();
    while let Some(field) = inbound
        .next_field()
        .await
        .map_err(|e| ProxyError::Unexpected(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ProxyError::Unexpected(format!("invalid multipart body: {}", e)))?;

        let mut part = multipart::Part::bytes(data.to_vec());
        if let Some(file_name) = file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|e| ProxyError::Unexpected(e.to_string()))?;
        }
        form = form.part(name, part);
    }

    Ok(form)
}
