//! Tunnel proxy library.
//!
//! A reverse proxy with a single, runtime-replaceable upstream. Requests are
//! either forwarded and relayed (proxy mode) or answered with a redirect
//! (redirect mode); `/tunnel_update` repoints the upstream without a restart.

pub mod admin;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use upstream::UpstreamTarget;
