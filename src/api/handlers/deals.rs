//! Deal handlers: publish, list, proximity search, get.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateDealRequest, DealListResponse, DealResponse, NearbyDealsResponse, NearbyParams,
    PaginationMeta, PaginationParams,
};
use crate::api::principal::{Principal, Role};
use crate::app_state::AppState;
use crate::domain::{DealId, GeoPoint};
use crate::error::{ErrorResponse, MarketError};
use crate::service::DEFAULT_SEARCH_RADIUS_METERS;

/// `POST /deals` — Publish a new deal.
///
/// Vendor-only. Returns once the deal is stored; the proximity
/// notification fan-out runs on a background task.
///
/// # Errors
///
/// Returns [`MarketError`] on validation failure or a non-vendor caller.
#[utoipa::path(
    post,
    path = "/api/v1/deals",
    tag = "Deals",
    summary = "Publish a deal",
    description = "Publishes a time-limited deal at a location. AI copy is generated server-side; vendor text takes display precedence when present. Requires the vendor role.",
    request_body = CreateDealRequest,
    responses(
        (status = 201, description = "Deal published", body = DealResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 401, description = "Missing principal headers", body = ErrorResponse),
        (status = 403, description = "Caller is not a vendor", body = ErrorResponse),
    )
)]
pub async fn create_deal(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<CreateDealRequest>,
) -> Result<impl IntoResponse, MarketError> {
    principal.require(Role::Vendor)?;
    let deal = state
        .market
        .publish_deal(principal.user_id, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(DealResponse::from(&deal))))
}

/// `GET /deals` — List all deals, newest first, paginated.
///
/// # Errors
///
/// Returns [`MarketError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/deals",
    tag = "Deals",
    summary = "List deals",
    description = "Returns all deals newest first, with no status or expiry filtering.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated deal list", body = DealListResponse),
    )
)]
pub async fn list_deals(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, MarketError> {
    let params = params.clamped();
    let deals = state.market.list_deals().await;

    let total = deals.len() as u32;
    let per_page = params.per_page;
    let page = params.page;
    let total_pages = if total == 0 {
        0
    } else {
        total.div_ceil(per_page)
    };

    // Widen before multiplying: a huge `page` must mean an empty page,
    // not an overflow panic on a public GET.
    let start = (u64::from(page) - 1) * u64::from(per_page);
    let data: Vec<DealResponse> = deals
        .iter()
        .skip(usize::try_from(start).unwrap_or(usize::MAX))
        .take(per_page as usize)
        .map(DealResponse::from)
        .collect();

    Ok(Json(DealListResponse {
        data,
        pagination: PaginationMeta {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// `GET /deals/nearby` — Live deals within a radius of a point.
///
/// # Errors
///
/// Returns [`MarketError::InvalidRequest`] for out-of-range coordinates
/// or a non-positive radius.
#[utoipa::path(
    get,
    path = "/api/v1/deals/nearby",
    tag = "Deals",
    summary = "Proximity search",
    description = "Returns active, unexpired deals within `radius_m` meters of the given point. Distances use the haversine great-circle formula; the radius defaults to 2000 meters.",
    params(NearbyParams),
    responses(
        (status = 200, description = "Matching live deals", body = NearbyDealsResponse),
        (status = 400, description = "Invalid coordinates or radius", body = ErrorResponse),
    )
)]
pub async fn nearby_deals(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> Result<impl IntoResponse, MarketError> {
    let center = GeoPoint::new(params.lat, params.lon);
    let deals = state.market.deals_near(center, params.radius_m).await?;

    Ok(Json(NearbyDealsResponse {
        data: deals.iter().map(DealResponse::from).collect(),
        radius_meters: params.radius_m.unwrap_or(DEFAULT_SEARCH_RADIUS_METERS),
    }))
}

/// `GET /deals/:id` — Get a single deal.
///
/// # Errors
///
/// Returns [`MarketError::DealNotFound`] if the deal does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/deals/{id}",
    tag = "Deals",
    summary = "Get deal details",
    description = "Returns one deal by ID, regardless of status or expiry.",
    params(
        ("id" = uuid::Uuid, Path, description = "Deal UUID"),
    ),
    responses(
        (status = 200, description = "Deal details", body = DealResponse),
        (status = 404, description = "Deal not found", body = ErrorResponse),
    )
)]
pub async fn get_deal(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, MarketError> {
    let deal = state.market.find_deal(DealId::from_uuid(id)).await?;
    Ok(Json(DealResponse::from(&deal)))
}

/// Deal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/deals", post(create_deal).get(list_deals))
        .route("/deals/nearby", get(nearby_deals))
        .route("/deals/{id}", get(get_deal))
}
