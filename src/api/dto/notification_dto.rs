//! Notification subscription DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Subscription;

/// Request body for `POST /notifications/subscriptions`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    /// Device push token. One active subscription per `(user, token)`.
    pub token: String,
    /// Subscription center latitude in degrees.
    pub lat: f64,
    /// Subscription center longitude in degrees.
    pub lon: f64,
    /// Notification radius in meters, in `(0, 50000]`.
    pub radius_m: f64,
}

/// Query parameters for `DELETE /notifications/subscriptions`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UnsubscribeParams {
    /// Device push token to remove.
    pub token: String,
}

/// Subscription row as exposed over the API. The push token is echoed
/// back only to its owner.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    /// Subscription identifier.
    pub id: uuid::Uuid,
    /// Owning user.
    pub user_id: uuid::Uuid,
    /// Device push token.
    pub token: String,
    /// Center latitude in degrees.
    pub lat: f64,
    /// Center longitude in degrees.
    pub lon: f64,
    /// Notification radius in meters.
    pub radius_m: f64,
    /// Whether the subscription currently receives notifications.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last successful notification delivery, if any.
    pub last_notification_sent: Option<DateTime<Utc>>,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: *sub.id.as_uuid(),
            user_id: *sub.user_id.as_uuid(),
            token: sub.token.clone(),
            lat: sub.lat,
            lon: sub.lon,
            radius_m: sub.radius_meters,
            active: sub.active,
            created_at: sub.created_at,
            last_notification_sent: sub.last_notification_sent,
        }
    }
}

/// List response for `GET /notifications/subscriptions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriptionListResponse {
    /// All subscriptions owned by the caller.
    pub data: Vec<SubscriptionResponse>,
}
