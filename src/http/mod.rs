//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route table)
//!     → request.rs (request ID, ForwardKind, outbound headers)
//!     → crate::proxy (forward or redirect)
//!     → response.rs (relay upstream status, headers, body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ForwardKind, MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
