//! Exclusive claim relation between a deal and a user.
//!
//! [`ClaimLedger`] enforces at-most-one claim per `(deal, user)` pair with
//! an atomic check-and-insert at the storage boundary: the composite key IS
//! the uniqueness invariant. The insert happens through the map's entry API
//! under a single write lock, so two concurrent claims on the same key can
//! never both succeed; the occupied entry is the authoritative
//! "already claimed" signal, not a prior existence probe.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::ids::{DealId, UserId};
use crate::error::MarketError;

/// A customer's exclusive reservation of a deal.
///
/// Identity is the composite `(deal_id, user_id)` key. Created once;
/// mutated at most once to attach a rating; never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct Claim {
    /// Claimed deal.
    pub deal_id: DealId,
    /// Claiming user.
    pub user_id: UserId,
    /// Claim timestamp.
    pub created_at: DateTime<Utc>,
    /// Rating attached via the claim pathway, 1–5.
    pub rating: Option<u8>,
    /// Optional rating comment.
    pub comment: Option<String>,
    /// When the rating was attached.
    pub rated_at: Option<DateTime<Utc>>,
}

/// Ledger of all claims, keyed by `(deal_id, user_id)`.
///
/// This pathway carries its own embedded rating and deliberately does NOT
/// touch the vendor aggregate or trigger notifications; the standalone
/// rating pathway in [`super::RatingAggregator`] does.
#[derive(Debug, Default)]
pub struct ClaimLedger {
    claims: RwLock<HashMap<(DealId, UserId), Claim>>,
}

impl ClaimLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a claim for `(deal_id, user_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::AlreadyClaimed`] if a claim row already
    /// exists for the key. Exactly one of any set of concurrent callers
    /// on the same key succeeds.
    pub async fn claim(&self, deal_id: DealId, user_id: UserId) -> Result<Claim, MarketError> {
        let mut map = self.claims.write().await;
        match map.entry((deal_id, user_id)) {
            Entry::Occupied(_) => Err(MarketError::AlreadyClaimed(*deal_id.as_uuid())),
            Entry::Vacant(slot) => {
                let claim = Claim {
                    deal_id,
                    user_id,
                    created_at: Utc::now(),
                    rating: None,
                    comment: None,
                    rated_at: None,
                };
                Ok(slot.insert(claim).clone())
            }
        }
    }

    /// Attaches a rating to an existing claim.
    ///
    /// `rated_at` defaults to now when not provided. The rating value is
    /// validated by the caller before this point.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NoSuchClaim`] if no claim row exists for the
    /// key, or [`MarketError::AlreadyRated`] if the claim's rating field is
    /// already set.
    pub async fn rate_via_claim(
        &self,
        deal_id: DealId,
        user_id: UserId,
        rating: u8,
        comment: Option<String>,
        rated_at: Option<DateTime<Utc>>,
    ) -> Result<Claim, MarketError> {
        let mut map = self.claims.write().await;
        let Some(claim) = map.get_mut(&(deal_id, user_id)) else {
            return Err(MarketError::NoSuchClaim(*deal_id.as_uuid()));
        };
        if claim.rating.is_some() {
            return Err(MarketError::AlreadyRated(*deal_id.as_uuid()));
        }
        claim.rating = Some(rating);
        claim.comment = comment;
        claim.rated_at = Some(rated_at.unwrap_or_else(Utc::now));
        Ok(claim.clone())
    }

    /// Returns a snapshot of the claim for the key, if present.
    pub async fn get(&self, deal_id: DealId, user_id: UserId) -> Option<Claim> {
        self.claims.read().await.get(&(deal_id, user_id)).cloned()
    }

    /// Returns the number of claim rows.
    pub async fn len(&self) -> usize {
        self.claims.read().await.len()
    }

    /// Returns `true` if the ledger holds no claims.
    pub async fn is_empty(&self) -> bool {
        self.claims.read().await.is_empty()
    }
}
