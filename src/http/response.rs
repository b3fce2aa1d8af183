//! Response relay from the upstream to the caller.
//!
//! # Responsibilities
//! - Copy the upstream status, headers and body onto the caller's response
//! - Strip encoding headers that no longer describe the relayed body
//!
//! # Design Decisions
//! - The body is buffered; streaming is out of scope
//! - The outbound client already decoded any compressed body, so
//!   `Content-Encoding` and `Transfer-Encoding` are dropped

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName};
use axum::response::Response;

/// Response headers never copied back to the caller.
pub const STRIPPED_RESPONSE_HEADERS: [HeaderName; 2] =
    [header::TRANSFER_ENCODING, header::CONTENT_ENCODING];

/// Copy upstream headers, keeping repeated values and dropping encoding headers.
pub fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream.iter() {
        if STRIPPED_RESPONSE_HEADERS.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Buffer an upstream response and turn it into the caller's response.
pub async fn relay(upstream: reqwest::Response) -> Result<Response, reqwest::Error> {
    let status = upstream.status();
    let headers = relay_headers(upstream.headers());
    let body = upstream.bytes().await?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
