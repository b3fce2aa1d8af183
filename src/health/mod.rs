//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health
//!     → probe.rs (one GET against the current upstream, short deadline)
//!     → HealthProbe { Connected | ErrorStatus | Timeout | Unreachable }
//!     → endpoint.rs (200 healthy / 503 unhealthy)
//! ```
//!
//! # Design Decisions
//! - On demand only; there is no background monitor
//! - Only an exact 200 counts as connected
//! - Timeout and connection failure are distinct internally but reported
//!   to callers as the same `not_accessible` state

pub mod endpoint;
pub mod probe;

pub use endpoint::health_handler;
pub use probe::{probe, HealthProbe};
