//! Notification subscription handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{
    SubscribeRequest, SubscriptionListResponse, SubscriptionResponse, UnsubscribeParams,
};
use crate::api::principal::{Principal, Role};
use crate::app_state::AppState;
use crate::domain::GeoPoint;
use crate::error::{ErrorResponse, MarketError};

/// `POST /notifications/subscriptions` — Subscribe to nearby-deal pushes.
///
/// Re-subscribing with the same device token replaces the previous
/// subscription rather than stacking a second one.
///
/// # Errors
///
/// Returns [`MarketError::InvalidRadius`] for a radius outside
/// `(0, 50000]` and [`MarketError::InvalidRequest`] for a blank token or
/// out-of-range coordinates.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/subscriptions",
    tag = "Notifications",
    summary = "Subscribe to proximity notifications",
    description = "Registers a device token for push notifications about new deals within `radius_m` meters of a point. A repeat subscription with the same token replaces the old one. Requires the customer role.",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Invalid token, coordinates, or radius", body = ErrorResponse),
        (status = 401, description = "Missing principal headers", body = ErrorResponse),
        (status = 403, description = "Caller is not a customer", body = ErrorResponse),
    )
)]
pub async fn subscribe(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, MarketError> {
    principal.require(Role::Customer)?;
    let subscription = state
        .market
        .subscribe(
            principal.user_id,
            req.token,
            GeoPoint::new(req.lat, req.lon),
            req.radius_m,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::from(&subscription)),
    ))
}

/// `DELETE /notifications/subscriptions` — Drop a device subscription.
///
/// Idempotent: deleting an absent token still returns 204.
///
/// # Errors
///
/// Returns [`MarketError::Forbidden`] for a non-customer caller.
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/subscriptions",
    tag = "Notifications",
    summary = "Unsubscribe a device",
    description = "Removes the caller's subscription for the given device token. No error when the token has no subscription.",
    params(UnsubscribeParams),
    responses(
        (status = 204, description = "Subscription removed (or was absent)"),
        (status = 401, description = "Missing principal headers", body = ErrorResponse),
        (status = 403, description = "Caller is not a customer", body = ErrorResponse),
    )
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<UnsubscribeParams>,
) -> Result<impl IntoResponse, MarketError> {
    principal.require(Role::Customer)?;
    state.market.unsubscribe(principal.user_id, &params.token).await;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /notifications/subscriptions` — List the caller's subscriptions.
///
/// # Errors
///
/// Returns [`MarketError::Unauthenticated`] without principal headers.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/subscriptions",
    tag = "Notifications",
    summary = "List own subscriptions",
    description = "Returns every subscription owned by the calling user, any role.",
    responses(
        (status = 200, description = "Caller's subscriptions", body = SubscriptionListResponse),
        (status = 401, description = "Missing principal headers", body = ErrorResponse),
    )
)]
pub async fn list_subscriptions(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<impl IntoResponse, MarketError> {
    let subs = state.market.user_subscriptions(principal.user_id).await;
    Ok(Json(SubscriptionListResponse {
        data: subs.iter().map(SubscriptionResponse::from).collect(),
    }))
}

/// Notification subscription routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/notifications/subscriptions",
        post(subscribe).get(list_subscriptions).delete(unsubscribe),
    )
}
