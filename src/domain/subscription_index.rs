//! Notification subscriptions and proximity matching.
//!
//! [`SubscriptionIndex`] owns all push-notification subscriptions. A user
//! holds at most one active subscription per device token: re-subscribing
//! with the same `(user, token)` replaces the old row outright rather than
//! merging into it. Matching is a full scan with a per-row Haversine
//! predicate against each subscription's own radius; there is no spatial
//! index here on purpose.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::geo::{GeoPoint, haversine_meters};
use super::ids::{SubscriptionId, UserId};
use crate::error::MarketError;

/// Maximum allowed subscription radius in meters.
pub const MAX_RADIUS_METERS: f64 = 50_000.0;

/// A customer's registration for push notifications around a point.
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    /// Generated subscription identifier.
    pub id: SubscriptionId,
    /// Owning user.
    pub user_id: UserId,
    /// Opaque push device token.
    pub token: String,
    /// Center latitude in degrees.
    pub lat: f64,
    /// Center longitude in degrees.
    pub lon: f64,
    /// Notification radius in meters, `(0, 50000]`.
    pub radius_meters: f64,
    /// Whether the subscription receives notifications.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When a notification was last delivered to this subscription.
    pub last_notification_sent: Option<DateTime<Utc>>,
}

impl Subscription {
    /// The subscription's center point.
    #[must_use]
    pub const fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// Index of all notification subscriptions.
#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl SubscriptionIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a subscription for `(user_id, token)`, replacing any
    /// existing row for that key. Replacement, not update-in-place, keeps
    /// re-subscription idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRadius`] unless
    /// `0 < radius_meters <= 50000`.
    pub async fn subscribe(
        &self,
        user_id: UserId,
        token: String,
        center: GeoPoint,
        radius_meters: f64,
    ) -> Result<Subscription, MarketError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 || radius_meters > MAX_RADIUS_METERS {
            return Err(MarketError::InvalidRadius(radius_meters));
        }

        let mut map = self.subscriptions.write().await;
        map.retain(|_, sub| !(sub.user_id == user_id && sub.token == token));

        let subscription = Subscription {
            id: SubscriptionId::new(),
            user_id,
            token,
            lat: center.lat,
            lon: center.lon,
            radius_meters,
            active: true,
            created_at: Utc::now(),
            last_notification_sent: None,
        };
        map.insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    /// Deletes the subscription for `(user_id, token)`. No-op when absent.
    pub async fn unsubscribe(&self, user_id: UserId, token: &str) {
        let mut map = self.subscriptions.write().await;
        map.retain(|_, sub| !(sub.user_id == user_id && sub.token == token));
    }

    /// Returns all subscriptions owned by the given user.
    pub async fn find_by_user(&self, user_id: UserId) -> Vec<Subscription> {
        let map = self.subscriptions.read().await;
        map.values()
            .filter(|sub| sub.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Returns every active subscription whose own radius covers the given
    /// point. O(n) full scan; each row is matched against its own radius.
    pub async fn find_matching(&self, point: GeoPoint) -> Vec<Subscription> {
        let map = self.subscriptions.read().await;
        map.values()
            .filter(|sub| sub.active)
            .filter(|sub| haversine_meters(point, sub.position()) <= sub.radius_meters)
            .cloned()
            .collect()
    }

    /// Stamps `last_notification_sent` on a subscription after a
    /// successful delivery. No-op if the row was removed in the meantime.
    pub async fn mark_notified(&self, id: SubscriptionId, at: DateTime<Utc>) {
        let mut map = self.subscriptions.write().await;
        if let Some(sub) = map.get_mut(&id) {
            sub.last_notification_sent = Some(at);
        }
    }

    /// Returns the number of subscription rows.
    pub async fn len(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Returns `true` if the index holds no subscriptions.
    pub async fn is_empty(&self) -> bool {
        self.subscriptions.read().await.is_empty()
    }
}
