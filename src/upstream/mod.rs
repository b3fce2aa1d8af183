//! Upstream target subsystem.
//!
//! # Data Flow
//! ```text
//! config.upstream.default_url
//!     → target.rs (UpstreamTarget, created once at startup)
//!     → shared via Arc in AppState
//!
//! POST /tunnel_update
//!     → UpstreamTarget::update (whole-state swap)
//!     → every later load() observes the new URL
//! ```
//!
//! # Design Decisions
//! - One upstream only; no pool, no balancing
//! - State is swapped as a single `Arc`, never field by field
//! - Nothing is persisted; a restart reverts to the configured default

pub mod target;
pub mod join;

pub use self::target::{UpstreamState, UpstreamTarget, UpstreamUpdate};
pub use self::join::build_target_url;
