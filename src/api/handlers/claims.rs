//! Claim handlers: reserve a deal and rate it through the claim.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ClaimResponse, RateClaimRequest};
use crate::api::principal::{Principal, Role};
use crate::app_state::AppState;
use crate::domain::DealId;
use crate::error::{ErrorResponse, MarketError};

/// `POST /deals/:id/claims` — Claim a deal for the calling customer.
///
/// At most one claim per `(deal, user)` pair; a repeat attempt returns
/// 409. Claiming does not change the deal's stored status.
///
/// # Errors
///
/// Returns [`MarketError::AlreadyClaimed`] on a duplicate claim.
#[utoipa::path(
    post,
    path = "/api/v1/deals/{id}/claims",
    tag = "Claims",
    summary = "Claim a deal",
    description = "Records an exclusive claim on the deal for the calling customer. Duplicate claims by the same user return 409 Conflict. Requires the customer role.",
    params(
        ("id" = uuid::Uuid, Path, description = "Deal UUID"),
    ),
    responses(
        (status = 201, description = "Claim recorded", body = ClaimResponse),
        (status = 401, description = "Missing principal headers", body = ErrorResponse),
        (status = 403, description = "Caller is not a customer", body = ErrorResponse),
        (status = 409, description = "Already claimed by this user", body = ErrorResponse),
    )
)]
pub async fn claim_deal(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    principal.require(Role::Customer)?;
    let claim = state
        .market
        .claim_deal(DealId::from_uuid(id), principal.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ClaimResponse::from(&claim))))
}

/// `POST /deals/:id/claims/rating` — Rate a previously claimed deal.
///
/// The claim-embedded rating is isolated: it never updates the vendor
/// aggregate and never triggers notifications.
///
/// # Errors
///
/// Returns [`MarketError::NoSuchClaim`] when the caller has no claim on
/// the deal and [`MarketError::AlreadyRated`] when the claim already
/// carries a rating.
#[utoipa::path(
    post,
    path = "/api/v1/deals/{id}/claims/rating",
    tag = "Claims",
    summary = "Rate a claimed deal",
    description = "Attaches a 1-5 rating to the caller's existing claim. A claim may be rated once. This pathway does not touch the vendor rating aggregate. Requires the customer role.",
    params(
        ("id" = uuid::Uuid, Path, description = "Deal UUID"),
    ),
    request_body = RateClaimRequest,
    responses(
        (status = 200, description = "Rating attached to the claim", body = ClaimResponse),
        (status = 400, description = "Rating outside [1, 5]", body = ErrorResponse),
        (status = 404, description = "No claim for this deal and user", body = ErrorResponse),
        (status = 409, description = "Claim already rated", body = ErrorResponse),
    )
)]
pub async fn rate_claim(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RateClaimRequest>,
) -> Result<impl IntoResponse, MarketError> {
    principal.require(Role::Customer)?;
    let claim = state
        .market
        .rate_claim(
            DealId::from_uuid(id),
            principal.user_id,
            req.rating,
            req.comment,
            req.rated_at,
        )
        .await?;
    Ok(Json(ClaimResponse::from(&claim)))
}

/// Claim routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deals/{id}/claims", post(claim_deal))
        .route("/deals/{id}/claims/rating", post(rate_claim))
}
