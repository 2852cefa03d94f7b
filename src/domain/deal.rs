//! Deal entity: a time-limited offer published by a vendor at a location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::geo::GeoPoint;
use super::ids::{DealId, UserId};

/// Business category of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealCategory {
    /// Restaurants, cafes, groceries.
    Food,
    /// Salons, repairs, professional services.
    Service,
    /// Anything else.
    Other,
}

/// Lifecycle status of a deal.
///
/// A deal starts `Active`. No operation in this core transitions the
/// stored status; read paths additionally treat a deal past its expiry
/// timestamp as inactive (lazy expiry, no background sweep).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStatus {
    /// Visible to customers.
    Active,
    /// Reserved by a customer.
    Claimed,
    /// Past its expiry timestamp.
    Expired,
    /// Withdrawn by the vendor or an admin.
    Removed,
}

/// A published deal.
///
/// Carries both vendor-authored and AI-generated copy; the display title
/// and description prefer the vendor's text when present.
#[derive(Debug, Clone, Serialize)]
pub struct Deal {
    /// Unique deal identifier (immutable after publication).
    pub id: DealId,
    /// Owning vendor.
    pub vendor_id: UserId,
    /// AI-generated title (always present).
    pub title_ai: String,
    /// Vendor-authored title override.
    pub title_vendor: Option<String>,
    /// AI-generated description (always present).
    pub description_ai: String,
    /// Vendor-authored description override.
    pub description_vendor: Option<String>,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Altitude in meters, if known.
    pub alt: Option<f64>,
    /// Building floor, if indoors.
    pub floor: Option<i32>,
    /// Business category.
    pub category: DealCategory,
    /// Expiry timestamp; the deal is inactive past this instant.
    pub expires_at: DateTime<Utc>,
    /// Stored lifecycle status.
    pub status: DealStatus,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
}

impl Deal {
    /// Display title: vendor override if present, else the AI title.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title_vendor.as_deref().unwrap_or(&self.title_ai)
    }

    /// Display description: vendor override if present, else AI.
    #[must_use]
    pub fn display_description(&self) -> &str {
        self.description_vendor
            .as_deref()
            .unwrap_or(&self.description_ai)
    }

    /// The deal's location as a [`GeoPoint`].
    #[must_use]
    pub const fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Returns `true` if the deal is visible to customers at `now`:
    /// stored status is `Active` and the expiry is still in the future.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.status == DealStatus::Active && self.expires_at > now
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn make_deal(vendor_id: UserId, lat: f64, lon: f64) -> Deal {
        Deal {
            id: DealId::new(),
            vendor_id,
            title_ai: "AI: Lunch special".to_string(),
            title_vendor: Some("Lunch special".to_string()),
            description_ai: "AI generated: Great offer!".to_string(),
            description_vendor: None,
            lat,
            lon,
            alt: None,
            floor: None,
            category: DealCategory::Food,
            expires_at: Utc::now() + Duration::hours(2),
            status: DealStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn display_title_prefers_vendor_text() {
        let mut deal = make_deal(UserId::new(), 50.0, 19.9);
        assert_eq!(deal.display_title(), "Lunch special");
        deal.title_vendor = None;
        assert_eq!(deal.display_title(), "AI: Lunch special");
    }

    #[test]
    fn display_description_falls_back_to_ai() {
        let deal = make_deal(UserId::new(), 50.0, 19.9);
        assert_eq!(deal.display_description(), "AI generated: Great offer!");
    }

    #[test]
    fn expired_deal_is_not_live() {
        let mut deal = make_deal(UserId::new(), 50.0, 19.9);
        assert!(deal.is_live(Utc::now()));
        deal.expires_at = Utc::now() - Duration::minutes(1);
        assert!(!deal.is_live(Utc::now()));
    }

    #[test]
    fn non_active_status_is_not_live() {
        let mut deal = make_deal(UserId::new(), 50.0, 19.9);
        deal.status = DealStatus::Removed;
        assert!(!deal.is_live(Utc::now()));
    }

    #[test]
    fn category_serializes_screaming_snake() {
        let json = serde_json::to_string(&DealCategory::Food).unwrap_or_default();
        assert_eq!(json, "\"FOOD\"");
        let json = serde_json::to_string(&DealStatus::Active).unwrap_or_default();
        assert_eq!(json, "\"ACTIVE\"");
    }
}
