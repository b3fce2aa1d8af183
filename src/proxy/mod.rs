//! Catch-all request handling.
//!
//! # Data Flow
//! ```text
//! Any request not matched by /health, /status or /tunnel_update
//!     → current upstream snapshot (crate::upstream)
//!     → proxy mode:    forward.rs  (classify → outbound call → relay)
//!       redirect mode: redirect.rs (302 Found → upstream)
//!     → failures mapped by error.rs (503 / 504 / 500, plain text)
//! ```
//!
//! # Design Decisions
//! - No retries: an unreachable upstream fails the request immediately
//! - Every error becomes a response; nothing escapes the handler

pub mod error;
pub mod forward;
pub mod redirect;

pub use error::ProxyError;
pub use forward::forward_handler;
pub use redirect::redirect_handler;
