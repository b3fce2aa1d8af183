//! Request handling and classification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Decide once per request how it will be forwarded (`ForwardKind`)
//! - Prepare the header set sent to the upstream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Hop-specific headers (`Host`, `Content-Length`, `Transfer-Encoding`)
//!   are recomputed by the outbound client, never copied
//! - `Accept-Encoding` is left to the outbound client so upstream bodies
//!   only arrive in encodings it can decode

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID, inbound and outbound.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request headers never copied to the upstream.
const SKIPPED_REQUEST_HEADERS: [HeaderName; 4] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::ACCEPT_ENCODING,
];

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID set by the middleware, for log correlation.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// How an inbound request is sent to the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardKind {
    /// Headers only.
    Get,
    /// JSON body, parsed and re-serialized.
    PostJson,
    /// Form fields and file parts, re-encoded.
    PostMultipart,
    /// Raw body bytes.
    PostRaw,
    /// Raw body bytes.
    Put,
    /// Headers only.
    Delete,
    /// Any other method: raw body bytes with the original method.
    Other(Method),
}

impl ForwardKind {
    /// Classify by method and, for POST, by declared media type.
    pub fn classify(method: &Method, headers: &HeaderMap) -> Self {
        match *method {
            Method::GET => ForwardKind::Get,
            Method::POST => match media_type(headers).as_deref() {
                Some("application/json") => ForwardKind::PostJson,
                Some("multipart/form-data") => ForwardKind::PostMultipart,
                _ => ForwardKind::PostRaw,
            },
            Method::PUT => ForwardKind::Put,
            Method::DELETE => ForwardKind::Delete,
            _ => ForwardKind::Other(method.clone()),
        }
    }
}

/// Lowercased `type/subtype` of the `Content-Type` header, parameters dropped.
fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = value.split(';').next()?.trim();
    Some(essence.to_ascii_lowercase())
}

/// Headers to send upstream for a request of the given kind.
pub fn forwarded_headers(headers: &HeaderMap, kind: &ForwardKind) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers.iter() {
        if SKIPPED_REQUEST_HEADERS.contains(name) {
            continue;
        }
        // The re-encoded form gets a new boundary.
        if *kind == ForwardKind::PostMultipart && *name == header::CONTENT_TYPE {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }

    forwarded
}
