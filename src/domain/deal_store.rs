//! Concurrent deal storage keyed by [`DealId`].
//!
//! [`DealStore`] holds all published deals in a `HashMap` behind a
//! [`tokio::sync::RwLock`]. Reads return clones, so listings are
//! eventually-consistent snapshots and tolerate staleness. The proximity
//! query is a deliberate full scan with a per-row Haversine predicate;
//! there is no spatial index.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::deal::Deal;
use super::geo::{GeoPoint, haversine_meters};
use super::ids::DealId;
use crate::error::MarketError;

/// Central store for all published deals.
#[derive(Debug, Default)]
pub struct DealStore {
    deals: RwLock<HashMap<DealId, Deal>>,
}

impl DealStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a newly published deal.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Internal`] if a deal with the same ID already
    /// exists (should never happen with UUID v4).
    pub async fn insert(&self, deal: Deal) -> Result<DealId, MarketError> {
        let deal_id = deal.id;
        let mut map = self.deals.write().await;
        match map.entry(deal_id) {
            Entry::Occupied(_) => Err(MarketError::Internal(format!(
                "deal {deal_id} already exists"
            ))),
            Entry::Vacant(slot) => {
                slot.insert(deal);
                Ok(deal_id)
            }
        }
    }

    /// Returns a snapshot of the deal with the given ID, if present.
    pub async fn get(&self, deal_id: DealId) -> Option<Deal> {
        self.deals.read().await.get(&deal_id).cloned()
    }

    /// Returns snapshots of all deals, newest first. Unfiltered; intended
    /// for admin and vendor listings.
    pub async fn list_all(&self) -> Vec<Deal> {
        let map = self.deals.read().await;
        let mut deals: Vec<Deal> = map.values().cloned().collect();
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deals
    }

    /// Returns live deals within `radius_meters` of the given point.
    ///
    /// A deal qualifies when its stored status is `Active`, its expiry is
    /// after `now`, and its Haversine distance from `center` is at most
    /// `radius_meters`. O(n) over all deals.
    pub async fn list_live_near(
        &self,
        center: GeoPoint,
        radius_meters: f64,
        now: DateTime<Utc>,
    ) -> Vec<Deal> {
        let map = self.deals.read().await;
        let mut deals: Vec<Deal> = map
            .values()
            .filter(|deal| deal.is_live(now))
            .filter(|deal| haversine_meters(center, deal.position()) <= radius_meters)
            .cloned()
            .collect();
        deals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        deals
    }

    /// Returns the number of stored deals.
    pub async fn len(&self) -> usize {
        self.deals.read().await.len()
    }

    /// Returns `true` if the store contains no deals.
    pub async fn is_empty(&self) -> bool {
        self.deals.read().await.is_empty()
    }
}
