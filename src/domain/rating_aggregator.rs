//! Standalone rating records and the vendor aggregate update path.
//!
//! [`RatingAggregator`] owns the rating rows (unique on `(deal, user)`)
//! and drives the per-vendor aggregate in [`VendorDirectory`]. This is the
//! canonical rating pathway: it alone updates the vendor aggregate and
//! feeds the rating notification. The claim-embedded rating in
//! [`super::ClaimLedger`] is a separate, independent channel.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::deal::Deal;
use super::ids::{DealId, UserId};
use super::vendor_directory::VendorDirectory;
use std::sync::Arc;

use crate::error::MarketError;

/// A recorded 1–5 rating for a deal. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct RatingRecord {
    /// Generated rating identifier.
    pub id: uuid::Uuid,
    /// Rated deal.
    pub deal_id: DealId,
    /// Rating user.
    pub user_id: UserId,
    /// Rating value, 1–5.
    pub rating: u8,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Recording timestamp.
    pub rated_at: DateTime<Utc>,
}

/// Owner of rating rows and the vendor-aggregate update discipline.
///
/// # Concurrency
///
/// - Rating uniqueness is an atomic check-and-insert under the row map's
///   write lock, same discipline as the claim ledger.
/// - The vendor resolution happens while that lock is still held, so a
///   `VendorNotFound` failure can never leave an orphan rating row behind.
/// - The aggregate fold itself runs under the per-vendor mutex from
///   [`VendorDirectory`], never under the row map lock, so ratings for
///   different vendors do not contend.
#[derive(Debug)]
pub struct RatingAggregator {
    ratings: RwLock<HashMap<(DealId, UserId), RatingRecord>>,
    vendors: Arc<VendorDirectory>,
}

impl RatingAggregator {
    /// Creates an aggregator backed by the given vendor directory.
    #[must_use]
    pub fn new(vendors: Arc<VendorDirectory>) -> Self {
        Self {
            ratings: RwLock::new(HashMap::new()),
            vendors,
        }
    }

    /// Records a rating for `deal` by `user_id` and folds it into the
    /// deal's vendor aggregate.
    ///
    /// The rating value is validated by the caller before any persistence
    /// happens here.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::AlreadyRated`] if a rating row already exists
    /// for `(deal, user)`, or [`MarketError::VendorNotFound`] if the deal's
    /// vendor has no directory record.
    pub async fn rate(
        &self,
        deal: &Deal,
        user_id: UserId,
        rating: u8,
        comment: Option<String>,
    ) -> Result<RatingRecord, MarketError> {
        let key = (deal.id, user_id);

        let (record, aggregate) = {
            let mut map = self.ratings.write().await;
            if map.contains_key(&key) {
                return Err(MarketError::AlreadyRated(*deal.id.as_uuid()));
            }
            let aggregate = self
                .vendors
                .aggregate(deal.vendor_id)
                .await
                .ok_or(MarketError::VendorNotFound(*deal.vendor_id.as_uuid()))?;
            let record = RatingRecord {
                id: uuid::Uuid::new_v4(),
                deal_id: deal.id,
                user_id,
                rating,
                comment,
                rated_at: Utc::now(),
            };
            map.insert(key, record.clone());
            (record, aggregate)
        };

        {
            let mut agg = aggregate.lock().await;
            agg.apply(rating);
        }

        tracing::info!(
            deal_id = %deal.id,
            vendor_id = %deal.vendor_id,
            rating,
            "rating recorded"
        );
        Ok(record)
    }

    /// Returns a snapshot of the rating for the key, if present.
    pub async fn get(&self, deal_id: DealId, user_id: UserId) -> Option<RatingRecord> {
        self.ratings.read().await.get(&(deal_id, user_id)).cloned()
    }

    /// Returns the number of rating rows.
    pub async fn len(&self) -> usize {
        self.ratings.read().await.len()
    }

    /// Returns `true` if no ratings are stored.
    pub async fn is_empty(&self) -> bool {
        self.ratings.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::deal::tests::make_deal;
    use crate::domain::vendor_directory::round2;

    fn make_aggregator() -> (Arc<VendorDirectory>, RatingAggregator) {
        let vendors = Arc::new(VendorDirectory::new());
        let aggregator = RatingAggregator::new(Arc::clone(&vendors));
        (vendors, aggregator)
    }

    #[tokio::test]
    async fn rate_records_row_and_updates_aggregate() {
        let (vendors, aggregator) = make_aggregator();
        let vendor = UserId::new();
        vendors.ensure(vendor).await;
        let deal = make_deal(vendor, 50.0, 19.9);

        let result = aggregator.rate(&deal, UserId::new(), 5, None).await;
        assert!(result.is_ok());

        let snap = vendors.snapshot(vendor).await;
        let Some(snap) = snap else {
            panic!("vendor aggregate missing");
        };
        assert_eq!(snap.count, 1);
        assert!((snap.average - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn second_rating_for_same_pair_is_rejected() {
        let (vendors, aggregator) = make_aggregator();
        let vendor = UserId::new();
        vendors.ensure(vendor).await;
        let deal = make_deal(vendor, 50.0, 19.9);
        let user = UserId::new();

        assert!(aggregator.rate(&deal, user, 4, None).await.is_ok());
        let second = aggregator.rate(&deal, user, 2, None).await;
        assert!(matches!(second, Err(MarketError::AlreadyRated(_))));

        // The aggregate saw exactly one rating.
        let snap = vendors.snapshot(vendor).await;
        assert_eq!(snap.map(|a| a.count), Some(1));
    }

    #[tokio::test]
    async fn unknown_vendor_rejects_and_persists_nothing() {
        let (_vendors, aggregator) = make_aggregator();
        let deal = make_deal(UserId::new(), 50.0, 19.9);

        let result = aggregator.rate(&deal, UserId::new(), 5, None).await;
        assert!(matches!(result, Err(MarketError::VendorNotFound(_))));
        assert!(aggregator.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_ratings_on_same_vendor_lose_nothing() {
        let (vendors, aggregator) = make_aggregator();
        let vendor = UserId::new();
        vendors.ensure(vendor).await;

        let aggregator = Arc::new(aggregator);
        let ratings: Vec<u8> = (0..20).map(|i| (i % 5) + 1).collect();

        let mut handles = Vec::new();
        for &value in &ratings {
            let aggregator = Arc::clone(&aggregator);
            let deal = make_deal(vendor, 50.0, 19.9);
            handles.push(tokio::spawn(async move {
                aggregator.rate(&deal, UserId::new(), value, None).await
            }));
        }
        for handle in handles {
            let Ok(result) = handle.await else {
                panic!("rating task panicked");
            };
            assert!(result.is_ok());
        }

        let snap = vendors.snapshot(vendor).await;
        let Some(snap) = snap else {
            panic!("vendor aggregate missing");
        };
        let expected =
            round2(ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64);
        assert_eq!(snap.count, ratings.len() as u64);
        // The average is rounded after every fold, so the final value can
        // drift a few hundredths from the rounded arithmetic mean
        // depending on interleaving. Count being exact is the lost-update
        // check; the average only needs to be close.
        assert!(
            (snap.average - expected).abs() < 0.05,
            "expected about {expected}, got {}",
            snap.average
        );
    }
}
