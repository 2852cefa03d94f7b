//! Domain events emitted by marketplace mutations.
//!
//! Deal publication and rating recording emit a [`MarketEvent`] through
//! the [`super::EventBus`]. The notification dispatcher and the optional
//! PostgreSQL event log consume them asynchronously; the triggering
//! request never waits for either.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{DealId, UserId};

/// Domain event emitted after a marketplace mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// Emitted when a vendor publishes a new deal.
    DealPublished {
        /// Deal identifier.
        deal_id: DealId,
        /// Publishing vendor.
        vendor_id: UserId,
        /// Display title at publication time.
        title: String,
        /// Deal latitude in degrees.
        lat: f64,
        /// Deal longitude in degrees.
        lon: f64,
        /// Publication timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a standalone rating is recorded for a deal.
    RatingRecorded {
        /// Rated deal.
        deal_id: DealId,
        /// The deal's vendor (notification addressee).
        vendor_id: UserId,
        /// Display title of the rated deal.
        deal_title: String,
        /// Rating value, 1–5.
        rating: u8,
        /// Recording timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl MarketEvent {
    /// Returns the deal ID associated with this event.
    #[must_use]
    pub const fn deal_id(&self) -> DealId {
        match self {
            Self::DealPublished { deal_id, .. } | Self::RatingRecorded { deal_id, .. } => *deal_id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::DealPublished { .. } => "deal_published",
            Self::RatingRecorded { .. } => "rating_recorded",
        }
    }

    /// Returns the event timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::DealPublished { timestamp, .. } | Self::RatingRecorded { timestamp, .. } => {
                *timestamp
            }
        }
    }
}
