//! Admin endpoints: event log inspection.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::principal::{Principal, Role};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};
use crate::persistence::StoredMarketEvent;

/// Query parameters for `GET /admin/event-log`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct EventLogParams {
    /// Maximum number of rows to return. Defaults to 100, capped at 1000.
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response body for the event log endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventLogResponse {
    /// Whether the durable event log is configured.
    pub persistence_enabled: bool,
    /// Most recent events, newest first. Empty when persistence is off.
    pub data: Vec<StoredMarketEvent>,
}

/// `GET /admin/event-log` — Inspect the durable event log.
///
/// Admin-only. When persistence is disabled the endpoint still succeeds
/// and reports an empty log with `persistence_enabled: false`.
///
/// # Errors
///
/// Returns [`MarketError::PersistenceError`] when the database query
/// fails.
#[utoipa::path(
    get,
    path = "/api/v1/admin/event-log",
    tag = "Admin",
    summary = "Read the market event log",
    description = "Returns the most recent persisted market events, newest first. Requires the admin role.",
    params(EventLogParams),
    responses(
        (status = 200, description = "Recent event rows", body = EventLogResponse),
        (status = 401, description = "Missing principal headers", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 500, description = "Event log query failed", body = ErrorResponse),
    )
)]
pub async fn event_log(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<EventLogParams>,
) -> Result<impl IntoResponse, MarketError> {
    principal.require(Role::Admin)?;

    let limit = params.limit.unwrap_or(100).clamp(1, 1000);
    let data = match &state.event_log {
        Some(log) => log.recent(limit).await?,
        None => Vec::new(),
    };

    Ok(Json(EventLogResponse {
        persistence_enabled: state.event_log.is_some(),
        data,
    }))
}

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/event-log", get(event_log))
}
