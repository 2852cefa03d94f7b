//! Deal-related DTOs for publish, get, list, and proximity search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Deal, DealCategory, DealStatus};
use crate::service::NewDeal;

/// Request body for `POST /deals`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDealRequest {
    /// Vendor-authored title (required, non-blank).
    pub title: String,
    /// Vendor-authored description.
    #[serde(default)]
    pub description: Option<String>,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in meters.
    #[serde(default)]
    pub alt: Option<f64>,
    /// Building floor.
    #[serde(default)]
    pub floor: Option<i32>,
    /// Business category.
    pub category: DealCategory,
    /// Expiry timestamp; must be in the future.
    pub expires_at: DateTime<Utc>,
}

impl From<CreateDealRequest> for NewDeal {
    fn from(req: CreateDealRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            lat: req.lat,
            lon: req.lon,
            alt: req.alt,
            floor: req.floor,
            category: req.category,
            expires_at: req.expires_at,
        }
    }
}

/// Full deal representation for single-deal and list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct DealResponse {
    /// Deal identifier.
    pub id: uuid::Uuid,
    /// Owning vendor.
    pub vendor_id: uuid::Uuid,
    /// Display title (vendor text when present, else AI copy).
    pub title: String,
    /// Display description (vendor text when present, else AI copy).
    pub description: String,
    /// AI-generated title.
    pub title_ai: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in meters.
    pub alt: Option<f64>,
    /// Building floor.
    pub floor: Option<i32>,
    /// Business category.
    pub category: DealCategory,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// Stored lifecycle status.
    pub status: DealStatus,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Deal> for DealResponse {
    fn from(deal: &Deal) -> Self {
        Self {
            id: *deal.id.as_uuid(),
            vendor_id: *deal.vendor_id.as_uuid(),
            title: deal.display_title().to_string(),
            description: deal.display_description().to_string(),
            title_ai: deal.title_ai.clone(),
            lat: deal.lat,
            lon: deal.lon,
            alt: deal.alt,
            floor: deal.floor,
            category: deal.category,
            expires_at: deal.expires_at,
            status: deal.status,
            created_at: deal.created_at,
        }
    }
}

/// Paginated list response for `GET /deals`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DealListResponse {
    /// Deal rows for the requested page.
    pub data: Vec<DealResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response for `GET /deals/nearby`: unpaginated, distance-filtered.
#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyDealsResponse {
    /// Live deals within the search radius.
    pub data: Vec<DealResponse>,
    /// Echo of the effective search radius in meters.
    pub radius_meters: f64,
}

/// Query parameters for `GET /deals/nearby`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NearbyParams {
    /// Search center latitude in degrees.
    pub lat: f64,
    /// Search center longitude in degrees.
    pub lon: f64,
    /// Search radius in meters. Defaults to 2000.
    #[serde(default)]
    pub radius_m: Option<f64>,
}

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps the page to at least 1 and `per_page` to `[1, 100]`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }
}
