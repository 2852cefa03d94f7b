//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; the health check
//! lives at the root. Caller identity arrives via the `x-user-id` and
//! `x-user-role` headers set by the upstream auth proxy.

pub mod dto;
pub mod handlers;
pub mod principal;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
