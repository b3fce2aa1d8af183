//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, body limit)
//! - Dispatch catch-all requests to the proxy or redirect handler
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::{ProxyConfig, ProxyMode};
use crate::health::health_handler;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::proxy::{forward_handler, redirect_handler};
use crate::upstream::UpstreamTarget;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub upstream: Arc<UpstreamTarget>,
    pub client: reqwest::Client,
}

impl AppState {
    /// Build state from configuration; the upstream starts at the configured default.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        // Per-call deadlines are set on each request.
        let client = reqwest::Client::builder()
            .user_agent(concat!("tunnel-proxy/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()?;

        Ok(Self {
            upstream: Arc::new(UpstreamTarget::new(config.upstream.default_url.clone())),
            config: Arc::new(config),
            client,
        })
    }
}

/// HTTP server for the tunnel proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let state = AppState::new(config)?;
        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let catch_all = match state.config.mode {
            ProxyMode::Proxy => any(forward_handler),
            ProxyMode::Redirect => any(redirect_handler),
        };

        Router::new()
            .route("/health", get(health_handler))
            .merge(setup_admin_router())
            .route("/", catch_all.clone())
            .route("/{*path}", catch_all)
            .layer(DefaultBodyLimit::max(state.config.limits.max_body_size))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = crate::http::request::request_id(request.headers());
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            uri = %request.uri(),
                            request_id = %request_id,
                        )
                    }))
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. In-flight requests are allowed to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = %self.state.config.mode,
            upstream = %self.state.upstream.url(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method, StatusCode};
    use tower::ServiceExt;

    fn server(mode: ProxyMode) -> HttpServer {
        let mut config = ProxyConfig::default();
        config.mode = mode;
        config.upstream.default_url = "http://localhost:5000".into();
        HttpServer::new(config).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_update_then_status() {
        let server = server(ProxyMode::Proxy);
        let app = server.router();

        let response = app
            .clone()
            .oneshot(post_json(
                "/tunnel_update",
                r#"{"tunnel_url":"http://example.com:8080","source":"test"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["old_url"], "http://localhost:5000");
        assert_eq!(body["new_url"], "http://example.com:8080");
        assert_eq!(body["source"], "test");
        assert!(body["updated_at"].is_string());

        let response = app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["current_tunnel_url"], "http://example.com:8080");
        assert_eq!(body["original_tunnel_url"], "http://localhost:5000");
        assert_eq!(body["last_update_source"], "test");
        assert_eq!(body["port"], 10000);
        assert_eq!(body["environment"], "production");
        assert_eq!(body["mode"], "proxy");
    }

    #[tokio::test]
    async fn test_status_before_update() {
        let app = server(ProxyMode::Proxy).router();
        let response = app
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["current_tunnel_url"], body["original_tunnel_url"]);
        assert!(body["last_updated"].is_null());
    }

    #[tokio::test]
    async fn test_missing_tunnel_url_leaves_target_unchanged() {
        let server = server(ProxyMode::Proxy);
        let response = server
            .router()
            .oneshot(post_json("/tunnel_update", r#"{"source":"test"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["status"], "error");
        assert_eq!(server.state().upstream.url(), "http://localhost:5000");
        assert!(server.state().upstream.load().updated_at.is_none());
    }

    #[tokio::test]
    async fn test_non_json_update_is_server_error() {
        let server = server(ProxyMode::Proxy);
        let response = server
            .router()
            .oneshot(post_json("/tunnel_update", "not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["status"], "error");
        assert_eq!(server.state().upstream.url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn test_oversized_update_is_server_error() {
        let mut config = ProxyConfig::default();
        config.limits.max_body_size = 64;
        let server = HttpServer::new(config).unwrap();

        let body = format!(r#"{{"tunnel_url":"http://{}"}}"#, "a".repeat(128));
        let response = server
            .router()
            .oneshot(post_json("/tunnel_update", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["status"], "error");
        assert_eq!(server.state().upstream.url(), "http://localhost:5000");
    }

    #[tokio::test]
    async fn test_control_endpoint_rejects_get() {
        let response = server(ProxyMode::Proxy)
            .router()
            .oneshot(Request::get("/tunnel_update").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_redirect_mode() {
        let server = server(ProxyMode::Redirect);
        server.state().upstream.update("http://u", None);

        let response = server
            .router()
            .oneshot(Request::get("/foo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "http://u/foo");

        let response = server
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "http://u");
    }

    #[tokio::test]
    async fn test_redirect_rejects_unusable_location() {
        let server = server(ProxyMode::Redirect);
        server.state().upstream.update("http://u/\nbad", None);

        let response = server
            .router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = server(ProxyMode::Proxy)
            .router()
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().get(&X_REQUEST_ID).is_some());

        let response = server(ProxyMode::Proxy)
            .router()
            .oneshot(
                Request::get("/status")
                    .header(&X_REQUEST_ID, "caller-supplied")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers().get(&X_REQUEST_ID).unwrap(), "caller-supplied");
    }
}
