//! Per-vendor rating aggregates with single-writer-per-vendor locking.
//!
//! [`VendorDirectory`] holds the running rating average and count attached
//! to each vendor record. Each aggregate sits behind its own
//! [`tokio::sync::Mutex`], so concurrent ratings against the same vendor
//! are serialized and compose sequentially; ratings against different
//! vendors proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use super::ids::UserId;

/// Running rating average and count for a single vendor.
///
/// `count` equals the number of standalone rating rows for that vendor's
/// deals; `average` is their arithmetic mean rounded half-up to 2 decimal
/// places. Both start at 0 and are never decremented.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct VendorAggregate {
    /// Arithmetic mean of all ratings, rounded to 2 decimals.
    pub average: f64,
    /// Number of ratings received.
    pub count: u64,
}

impl VendorAggregate {
    /// Folds one new rating into the aggregate:
    /// `new_average = round2((average·count + rating)/(count + 1))`.
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(&mut self, rating: u8) {
        let total = self.average * self.count as f64 + f64::from(rating);
        self.count += 1;
        self.average = round2(total / self.count as f64);
    }
}

/// Rounds to 2 decimal places, half away from zero (half-up for the
/// non-negative values used here).
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Directory of vendor records and their rating aggregates.
#[derive(Debug, Default)]
pub struct VendorDirectory {
    vendors: RwLock<HashMap<UserId, Arc<Mutex<VendorAggregate>>>>,
}

impl VendorDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a vendor if not already present. Idempotent.
    pub async fn ensure(&self, vendor_id: UserId) {
        let mut map = self.vendors.write().await;
        map.entry(vendor_id).or_default();
    }

    /// Returns the per-vendor aggregate lock, or `None` for an unknown
    /// vendor. Callers lock it to update; holding the lock IS the
    /// per-vendor write serialization.
    pub async fn aggregate(&self, vendor_id: UserId) -> Option<Arc<Mutex<VendorAggregate>>> {
        self.vendors.read().await.get(&vendor_id).cloned()
    }

    /// Returns a point-in-time copy of a vendor's aggregate.
    pub async fn snapshot(&self, vendor_id: UserId) -> Option<VendorAggregate> {
        let handle = self.aggregate(vendor_id).await?;
        let agg = handle.lock().await;
        Some(*agg)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn apply_matches_reference_example() {
        // oldAverage=4.00, oldCount=2, new rating=5 => 4.33, count=3
        let mut agg = VendorAggregate {
            average: 4.00,
            count: 2,
        };
        agg.apply(5);
        assert!((agg.average - 4.33).abs() < 1e-9);
        assert_eq!(agg.count, 3);
    }

    #[test]
    fn first_rating_sets_average() {
        let mut agg = VendorAggregate::default();
        agg.apply(4);
        assert!((agg.average - 4.0).abs() < 1e-9);
        assert_eq!(agg.count, 1);
    }

    #[test]
    fn round2_is_half_up() {
        assert!((round2(4.335) - 4.34).abs() < 1e-9);
        assert!((round2(4.3349) - 4.33).abs() < 1e-9);
        assert!((round2(13.0 / 3.0) - 4.33).abs() < 1e-9);
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let dir = VendorDirectory::new();
        let vendor = UserId::new();
        dir.ensure(vendor).await;
        let handle = dir.aggregate(vendor).await;
        let Some(handle) = handle else {
            panic!("vendor missing after ensure");
        };
        handle.lock().await.apply(5);

        // Re-ensuring must not reset the aggregate.
        dir.ensure(vendor).await;
        let snap = dir.snapshot(vendor).await;
        assert_eq!(snap.map(|a| a.count), Some(1));
    }

    #[tokio::test]
    async fn unknown_vendor_has_no_aggregate() {
        let dir = VendorDirectory::new();
        assert!(dir.aggregate(UserId::new()).await.is_none());
        assert!(dir.snapshot(UserId::new()).await.is_none());
    }
}
