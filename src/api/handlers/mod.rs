//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod claims;
pub mod deals;
pub mod notifications;
pub mod ratings;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(deals::routes())
        .merge(claims::routes())
        .merge(ratings::routes())
        .merge(notifications::routes())
        .merge(admin::routes())
}
