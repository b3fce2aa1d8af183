//! The mutable upstream target.

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Snapshot of the current upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamState {
    /// Base URL requests are forwarded or redirected to.
    pub url: String,

    /// When the URL was last replaced through the control endpoint.
    pub updated_at: Option<DateTime<Utc>>,

    /// Label supplied by whoever performed the last update.
    pub source: Option<String>,
}

/// Result of a successful update: the states on both sides of the swap.
#[derive(Debug, Clone)]
pub struct UpstreamUpdate {
    pub previous: Arc<UpstreamState>,
    pub current: Arc<UpstreamState>,
}

/// Thread-safe holder of the upstream URL.
///
/// Readers `load` a full snapshot; writers replace the whole snapshot at once,
/// so a concurrent reader sees either the old state or the new one.
#[derive(Debug)]
pub struct UpstreamTarget {
    original: String,
    current: ArcSwap<UpstreamState>,
}

impl UpstreamTarget {
    /// Create a target pointing at `default_url`, never updated.
    pub fn new(default_url: impl Into<String>) -> Self {
        let original = default_url.into();
        let state = UpstreamState {
            url: original.clone(),
            updated_at: None,
            source: None,
        };

        Self {
            original,
            current: ArcSwap::from_pointee(state),
        }
    }

    /// The URL the process started with.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<UpstreamState> {
        self.current.load_full()
    }

    /// Current upstream URL.
    pub fn url(&self) -> String {
        self.current.load().url.clone()
    }

    /// Replace the upstream URL, stamping the update with the current time.
    ///
    /// No syntax or reachability check is performed on `url`.
    pub fn update(&self, url: impl Into<String>, source: Option<String>) -> UpstreamUpdate {
        let current = Arc::new(UpstreamState {
            url: url.into(),
            updated_at: Some(Utc::now()),
            source,
        });
        let previous = self.current.swap(current.clone());

        UpstreamUpdate { previous, current }
    }
}
