//! Control and status endpoints.
//!
//! `/tunnel_update` is unauthenticated: anyone who can reach the listener
//! can repoint the upstream. Deploy behind a trusted network boundary.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use crate::http::server::AppState;
use self::handlers::*;

pub fn setup_admin_router() -> Router<AppState> {
    Router::new()
        .route("/tunnel_update", post(update_tunnel))
        .route("/status", get(get_status))
}
