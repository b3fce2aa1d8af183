//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → environment overrides (CLOUDFLARED_TUNNEL_URL, PORT, FLASK_ENV, PROXY_MODE)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//! ```
//!
//! The upstream URL is the only runtime-mutable value and lives in
//! `crate::upstream`, not here.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    LimitsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, ProxyMode, TimeoutConfig,
    UpstreamConfig,
};
