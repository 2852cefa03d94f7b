//! Standalone rating handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{RateDealRequest, RatingResponse};
use crate::api::principal::{Principal, Role};
use crate::app_state::AppState;
use crate::domain::DealId;
use crate::error::{ErrorResponse, MarketError};

/// `POST /deals/:id/ratings` — Rate a deal directly.
///
/// The canonical rating pathway: persists the rating row, folds it into
/// the vendor's running average, and schedules the vendor notification.
/// No prior claim is required.
///
/// # Errors
///
/// Returns [`MarketError::InvalidRating`] before any persistence,
/// [`MarketError::DealNotFound`] for an unknown deal, or
/// [`MarketError::AlreadyRated`] on a duplicate `(deal, user)` rating.
#[utoipa::path(
    post,
    path = "/api/v1/deals/{id}/ratings",
    tag = "Ratings",
    summary = "Rate a deal",
    description = "Records a 1-5 rating, updates the vendor's rounded running average, and notifies the vendor asynchronously. One rating per user per deal. Requires the customer role.",
    params(
        ("id" = uuid::Uuid, Path, description = "Deal UUID"),
    ),
    request_body = RateDealRequest,
    responses(
        (status = 201, description = "Rating recorded", body = RatingResponse),
        (status = 400, description = "Rating outside [1, 5]", body = ErrorResponse),
        (status = 401, description = "Missing principal headers", body = ErrorResponse),
        (status = 403, description = "Caller is not a customer", body = ErrorResponse),
        (status = 404, description = "Deal or vendor not found", body = ErrorResponse),
        (status = 409, description = "Already rated by this user", body = ErrorResponse),
    )
)]
pub async fn rate_deal(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RateDealRequest>,
) -> Result<impl IntoResponse, MarketError> {
    principal.require(Role::Customer)?;
    let (record, vendor) = state
        .market
        .rate_deal(
            DealId::from_uuid(id),
            principal.user_id,
            req.rating,
            req.comment,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RatingResponse::from_record(&record, vendor)),
    ))
}

/// Rating routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/deals/{id}/ratings", post(rate_deal))
}
