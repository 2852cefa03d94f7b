//! Standalone rating DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{RatingRecord, VendorAggregate};

/// Request body for `POST /deals/{id}/ratings`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RateDealRequest {
    /// Star rating in `[1, 5]`.
    pub rating: u8,
    /// Optional free-text comment.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Response body for the standalone rating endpoint.
///
/// Includes the vendor aggregate after the rating was folded in.
#[derive(Debug, Serialize, ToSchema)]
pub struct RatingResponse {
    /// Rating row identifier.
    pub id: uuid::Uuid,
    /// Rated deal.
    pub deal_id: uuid::Uuid,
    /// Rating user.
    pub user_id: uuid::Uuid,
    /// Star rating.
    pub rating: u8,
    /// Free-text comment.
    pub comment: Option<String>,
    /// Server rating timestamp.
    pub rated_at: DateTime<Utc>,
    /// Vendor aggregate after this rating.
    pub vendor: Option<VendorRatingDto>,
}

/// Vendor rating aggregate as exposed over the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct VendorRatingDto {
    /// Running average, rounded half-up to two decimals.
    pub average: f64,
    /// Number of ratings folded into the average.
    pub count: u64,
}

impl From<VendorAggregate> for VendorRatingDto {
    fn from(agg: VendorAggregate) -> Self {
        Self {
            average: agg.average,
            count: agg.count,
        }
    }
}

impl RatingResponse {
    /// Builds the response from the stored record and the vendor snapshot.
    #[must_use]
    pub fn from_record(record: &RatingRecord, vendor: Option<VendorAggregate>) -> Self {
        Self {
            id: record.id,
            deal_id: *record.deal_id.as_uuid(),
            user_id: *record.user_id.as_uuid(),
            rating: record.rating,
            comment: record.comment.clone(),
            rated_at: record.rated_at,
            vendor: vendor.map(VendorRatingDto::from),
        }
    }
}
