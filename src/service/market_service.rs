//! Marketplace service: orchestrates the stores and emits events.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{
    Claim, ClaimLedger, Deal, DealCategory, DealId, DealStatus, DealStore, EventBus, GeoPoint,
    MarketEvent, RatingAggregator, RatingRecord, Subscription, SubscriptionIndex, UserId,
    VendorAggregate, VendorDirectory,
};
use crate::error::MarketError;
use crate::service::content::ContentGenerator;

/// Default proximity-search radius in meters when the caller gives none.
pub const DEFAULT_SEARCH_RADIUS_METERS: f64 = 2_000.0;

/// Validated input for publishing a deal.
///
/// Built explicitly from the transport DTO; no reflective mapping.
#[derive(Debug, Clone)]
pub struct NewDeal {
    /// Vendor-authored title (required, non-blank).
    pub title: String,
    /// Vendor-authored description.
    pub description: Option<String>,
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
    /// Expiry timestamp; must be in the future.
    pub expires_at: DateTime<Utc>,
}

/// Orchestration layer for all marketplace operations.
///
/// Stateless coordinator: owns references to the domain stores and the
/// [`EventBus`]. Every mutation follows the pattern: validate → mutate the
/// owning store → emit events → return. Event consumers (notification
/// fan-out, event log) run on their own tasks and are never awaited here.
#[derive(Debug, Clone)]
pub struct MarketService {
    deals: Arc<DealStore>,
    claims: Arc<ClaimLedger>,
    ratings: Arc<RatingAggregator>,
    subscriptions: Arc<SubscriptionIndex>,
    vendors: Arc<VendorDirectory>,
    content: Arc<dyn ContentGenerator>,
    event_bus: EventBus,
}

impl MarketService {
    /// Creates a new `MarketService` over the given stores.
    #[must_use]
    pub fn new(
        deals: Arc<DealStore>,
        claims: Arc<ClaimLedger>,
        ratings: Arc<RatingAggregator>,
        subscriptions: Arc<SubscriptionIndex>,
        vendors: Arc<VendorDirectory>,
        content: Arc<dyn ContentGenerator>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            deals,
            claims,
            ratings,
            subscriptions,
            vendors,
            content,
            event_bus,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the subscription index shared with the dispatcher.
    #[must_use]
    pub fn subscriptions(&self) -> &Arc<SubscriptionIndex> {
        &self.subscriptions
    }

    // ── Deals ───────────────────────────────────────────────────────────

    /// Publishes a new deal for `vendor_id` and schedules the proximity
    /// notification fan-out. Returns once the deal row is stored; the
    /// fan-out is never awaited.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRequest`] for a blank title or
    /// out-of-range coordinates, and [`MarketError::InvalidExpiry`] when
    /// the expiry is not in the future.
    pub async fn publish_deal(&self, vendor_id: UserId, input: NewDeal) -> Result<Deal, MarketError> {
        if input.title.trim().is_empty() {
            return Err(MarketError::InvalidRequest("title must not be blank".to_string()));
        }
        validate_point(GeoPoint::new(input.lat, input.lon))?;
        if input.expires_at <= Utc::now() {
            return Err(MarketError::InvalidExpiry);
        }

        let copy = self
            .content
            .generate(&input.title, input.description.as_deref());

        let deal = Deal {
            id: DealId::new(),
            vendor_id,
            title_ai: copy.title,
            title_vendor: Some(input.title),
            description_ai: copy.description,
            description_vendor: input.description,
            lat: input.lat,
            lon: input.lon,
            alt: input.alt,
            floor: input.floor,
            category: input.category,
            expires_at: input.expires_at,
            status: DealStatus::Active,
            created_at: Utc::now(),
        };

        self.vendors.ensure(vendor_id).await;
        self.deals.insert(deal.clone()).await?;

        let _ = self.event_bus.publish(MarketEvent::DealPublished {
            deal_id: deal.id,
            vendor_id,
            title: deal.display_title().to_string(),
            lat: deal.lat,
            lon: deal.lon,
            timestamp: Utc::now(),
        });

        tracing::info!(deal_id = %deal.id, %vendor_id, "deal published");
        Ok(deal)
    }

    /// Returns the deal with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::DealNotFound`] if no such deal exists.
    pub async fn find_deal(&self, deal_id: DealId) -> Result<Deal, MarketError> {
        self.deals
            .get(deal_id)
            .await
            .ok_or(MarketError::DealNotFound(*deal_id.as_uuid()))
    }

    /// Returns all deals, newest first. Unfiltered.
    pub async fn list_deals(&self) -> Vec<Deal> {
        self.deals.list_all().await
    }

    /// Returns live deals within `radius_meters` (default 2000 m) of the
    /// given point.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRequest`] for out-of-range
    /// coordinates or a non-positive radius.
    pub async fn deals_near(
        &self,
        center: GeoPoint,
        radius_meters: Option<f64>,
    ) -> Result<Vec<Deal>, MarketError> {
        validate_point(center)?;
        let radius = radius_meters.unwrap_or(DEFAULT_SEARCH_RADIUS_METERS);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(MarketError::InvalidRequest(format!(
                "search radius must be positive, got {radius}"
            )));
        }
        Ok(self.deals.list_live_near(center, radius, Utc::now()).await)
    }

    // ── Claims ──────────────────────────────────────────────────────────

    /// Claims a deal for `user_id`. No aggregate or notification side
    /// effects; the claim row is the only mutation.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::AlreadyClaimed`] when the `(deal, user)` key
    /// already exists.
    pub async fn claim_deal(&self, deal_id: DealId, user_id: UserId) -> Result<Claim, MarketError> {
        self.claims.claim(deal_id, user_id).await
    }

    /// Attaches a rating to an existing claim. This pathway does not touch
    /// the vendor aggregate and does not notify anyone.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRating`] for values outside `[1, 5]`,
    /// [`MarketError::NoSuchClaim`] when the claim is absent, or
    /// [`MarketError::AlreadyRated`] when the claim already carries one.
    pub async fn rate_claim(
        &self,
        deal_id: DealId,
        user_id: UserId,
        rating: u8,
        comment: Option<String>,
        rated_at: Option<DateTime<Utc>>,
    ) -> Result<Claim, MarketError> {
        validate_rating(rating)?;
        self.claims
            .rate_via_claim(deal_id, user_id, rating, comment, rated_at)
            .await
    }

    // ── Ratings ─────────────────────────────────────────────────────────

    /// Records a standalone rating, folds it into the vendor aggregate,
    /// and schedules the vendor notification. Returns the stored record
    /// together with the vendor aggregate after the fold, so callers
    /// never need a second lookup that could spuriously fail.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRating`] before any persistence for
    /// values outside `[1, 5]`, [`MarketError::DealNotFound`] for an
    /// unknown deal, [`MarketError::AlreadyRated`] for a duplicate
    /// `(deal, user)` key, or [`MarketError::VendorNotFound`] when the
    /// deal's vendor has no record.
    pub async fn rate_deal(
        &self,
        deal_id: DealId,
        user_id: UserId,
        rating: u8,
        comment: Option<String>,
    ) -> Result<(RatingRecord, Option<VendorAggregate>), MarketError> {
        validate_rating(rating)?;
        let deal = self.find_deal(deal_id).await?;
        let record = self.ratings.rate(&deal, user_id, rating, comment).await?;
        let vendor = self.vendors.snapshot(deal.vendor_id).await;

        let _ = self.event_bus.publish(MarketEvent::RatingRecorded {
            deal_id,
            vendor_id: deal.vendor_id,
            deal_title: deal.display_title().to_string(),
            rating,
            timestamp: Utc::now(),
        });

        Ok((record, vendor))
    }

    /// Returns the rating aggregate for a vendor, if the vendor exists.
    pub async fn vendor_rating(&self, vendor_id: UserId) -> Option<VendorAggregate> {
        self.vendors.snapshot(vendor_id).await
    }

    // ── Subscriptions ───────────────────────────────────────────────────

    /// Subscribes `user_id` to proximity notifications, replacing any
    /// existing subscription for the same device token.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRequest`] for a blank token or
    /// out-of-range coordinates, or [`MarketError::InvalidRadius`] for a
    /// radius outside `(0, 50000]`.
    pub async fn subscribe(
        &self,
        user_id: UserId,
        token: String,
        center: GeoPoint,
        radius_meters: f64,
    ) -> Result<Subscription, MarketError> {
        if token.trim().is_empty() {
            return Err(MarketError::InvalidRequest(
                "device token must not be blank".to_string(),
            ));
        }
        validate_point(center)?;
        let subscription = self
            .subscriptions
            .subscribe(user_id, token, center, radius_meters)
            .await?;
        tracing::info!(
            %user_id,
            radius_meters,
            lat = center.lat,
            lon = center.lon,
            "notification subscription created"
        );
        Ok(subscription)
    }

    /// Removes the subscription for `(user_id, token)`. Idempotent.
    pub async fn unsubscribe(&self, user_id: UserId, token: &str) {
        self.subscriptions.unsubscribe(user_id, token).await;
        tracing::info!(%user_id, "notification subscription removed");
    }

    /// Returns all subscriptions owned by the user.
    pub async fn user_subscriptions(&self, user_id: UserId) -> Vec<Subscription> {
        self.subscriptions.find_by_user(user_id).await
    }
}

/// Rejects out-of-range or non-finite coordinates.
fn validate_point(point: GeoPoint) -> Result<(), MarketError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(MarketError::InvalidRequest(format!(
            "coordinates out of range: ({}, {})",
            point.lat, point.lon
        )))
    }
}

/// Rejects rating values outside `[1, 5]` before any persistence.
const fn validate_rating(rating: u8) -> Result<(), MarketError> {
    if rating >= 1 && rating <= 5 {
        Ok(())
    } else {
        Err(MarketError::InvalidRating(rating))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::service::content::MockContentGenerator;
    use chrono::Duration;

    const KRAKOW: GeoPoint = GeoPoint::new(50.0647, 19.9450);

    fn make_service() -> MarketService {
        let vendors = Arc::new(VendorDirectory::new());
        MarketService::new(
            Arc::new(DealStore::new()),
            Arc::new(ClaimLedger::new()),
            Arc::new(RatingAggregator::new(Arc::clone(&vendors))),
            Arc::new(SubscriptionIndex::new()),
            vendors,
            Arc::new(MockContentGenerator::new()),
            EventBus::new(64),
        )
    }

    fn make_input() -> NewDeal {
        NewDeal {
            title: "Lunch -30%".to_string(),
            description: Some("Only today".to_string()),
            lat: KRAKOW.lat,
            lon: KRAKOW.lon,
            alt: None,
            floor: None,
            category: DealCategory::Food,
            expires_at: Utc::now() + Duration::hours(2),
        }
    }

    #[tokio::test]
    async fn publish_fills_ai_copy_and_emits_event() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();

        let deal = service.publish_deal(UserId::new(), make_input()).await;
        let Ok(deal) = deal else {
            panic!("publish failed");
        };
        assert_eq!(deal.title_ai, "AI: Lunch -30%");
        assert_eq!(deal.display_title(), "Lunch -30%");
        assert_eq!(deal.status, DealStatus::Active);

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "deal_published");
    }

    #[tokio::test]
    async fn publish_rejects_past_expiry() {
        let service = make_service();
        let mut input = make_input();
        input.expires_at = Utc::now() - Duration::minutes(1);

        let result = service.publish_deal(UserId::new(), input).await;
        assert!(matches!(result, Err(MarketError::InvalidExpiry)));
        assert!(service.list_deals().await.is_empty());
    }

    #[tokio::test]
    async fn publish_rejects_bad_coordinates() {
        let service = make_service();
        let mut input = make_input();
        input.lat = 91.0;

        let result = service.publish_deal(UserId::new(), input).await;
        assert!(matches!(result, Err(MarketError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn deals_near_uses_default_radius() {
        let service = make_service();
        let _ = service.publish_deal(UserId::new(), make_input()).await;

        let near = service.deals_near(KRAKOW, None).await;
        let Ok(near) = near else {
            panic!("query failed");
        };
        assert_eq!(near.len(), 1);

        // Warsaw is far outside any sane default radius.
        let far = service
            .deals_near(GeoPoint::new(52.2297, 21.0122), None)
            .await;
        assert!(far.is_ok_and(|deals| deals.is_empty()));
    }

    #[tokio::test]
    async fn rate_deal_out_of_range_persists_nothing() {
        let service = make_service();
        let deal = service.publish_deal(UserId::new(), make_input()).await;
        let Ok(deal) = deal else {
            panic!("publish failed");
        };

        let result = service.rate_deal(deal.id, UserId::new(), 6, None).await;
        assert!(matches!(result, Err(MarketError::InvalidRating(6))));
        assert!(service.vendor_rating(deal.vendor_id).await.is_some_and(|a| a.count == 0));

        let zero = service.rate_deal(deal.id, UserId::new(), 0, None).await;
        assert!(matches!(zero, Err(MarketError::InvalidRating(0))));
    }

    #[tokio::test]
    async fn rate_deal_updates_vendor_aggregate_and_emits() {
        let service = make_service();
        let vendor = UserId::new();
        let deal_a = service.publish_deal(vendor, make_input()).await;
        let deal_b = service.publish_deal(vendor, make_input()).await;
        let (Ok(deal_a), Ok(deal_b)) = (deal_a, deal_b) else {
            panic!("publish failed");
        };
        let mut rx = service.event_bus().subscribe();

        // Two 4s then a 5: average 4.33 per the rounding rule.
        let _ = service.rate_deal(deal_a.id, UserId::new(), 4, None).await;
        let _ = service.rate_deal(deal_a.id, UserId::new(), 4, None).await;
        let result = service.rate_deal(deal_b.id, UserId::new(), 5, None).await;

        // A successful rating carries the folded aggregate with it.
        let Ok((record, Some(agg))) = result else {
            panic!("rating failed or aggregate missing");
        };
        assert_eq!(record.rating, 5);
        assert_eq!(agg.count, 3);
        assert!((agg.average - 4.33).abs() < 1e-9);

        let snapshot = service.vendor_rating(vendor).await;
        assert!(snapshot.is_some_and(|a| a.count == 3));

        let event = rx.recv().await;
        let Ok(event) = event else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "rating_recorded");
    }

    #[tokio::test]
    async fn rate_unknown_deal_fails() {
        let service = make_service();
        let result = service
            .rate_deal(DealId::new(), UserId::new(), 5, None)
            .await;
        assert!(matches!(result, Err(MarketError::DealNotFound(_))));
    }

    #[tokio::test]
    async fn claim_then_duplicate_claim() {
        let service = make_service();
        let deal = DealId::new();
        let user = UserId::new();

        assert!(service.claim_deal(deal, user).await.is_ok());
        let second = service.claim_deal(deal, user).await;
        assert!(matches!(second, Err(MarketError::AlreadyClaimed(_))));
    }

    #[tokio::test]
    async fn claim_rating_path_is_isolated_from_aggregate() {
        let service = make_service();
        let vendor = UserId::new();
        let deal = service.publish_deal(vendor, make_input()).await;
        let Ok(deal) = deal else {
            panic!("publish failed");
        };
        let user = UserId::new();

        let _ = service.claim_deal(deal.id, user).await;
        let rated = service.rate_claim(deal.id, user, 5, None, None).await;
        assert!(rated.is_ok());

        // The claim-embedded rating must not touch the vendor aggregate.
        assert!(service.vendor_rating(vendor).await.is_some_and(|a| a.count == 0));
    }

    #[tokio::test]
    async fn subscribe_rejects_blank_token() {
        let service = make_service();
        let result = service
            .subscribe(UserId::new(), "  ".to_string(), KRAKOW, 1_000.0)
            .await;
        assert!(matches!(result, Err(MarketError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn subscribe_listing_and_unsubscribe_flow() {
        let service = make_service();
        let user = UserId::new();

        let _ = service
            .subscribe(user, "tok".to_string(), KRAKOW, 1_000.0)
            .await;
        let _ = service
            .subscribe(user, "tok".to_string(), KRAKOW, 3_000.0)
            .await;

        let subs = service.user_subscriptions(user).await;
        assert_eq!(subs.len(), 1);
        assert!(subs.first().is_some_and(|s| s.radius_meters == 3_000.0));

        service.unsubscribe(user, "tok").await;
        assert!(service.user_subscriptions(user).await.is_empty());
    }
}
