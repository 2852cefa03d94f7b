//! Claim DTOs: reserve a deal and rate it through the claim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Claim;

/// Response body for claim endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimResponse {
    /// Claimed deal.
    pub deal_id: uuid::Uuid,
    /// Claiming user.
    pub user_id: uuid::Uuid,
    /// Claim timestamp.
    pub created_at: DateTime<Utc>,
    /// Rating attached via the claim pathway, if any.
    pub rating: Option<u8>,
    /// Free-text comment attached with the rating.
    pub comment: Option<String>,
    /// When the rating was attached.
    pub rated_at: Option<DateTime<Utc>>,
}

impl From<&Claim> for ClaimResponse {
    fn from(claim: &Claim) -> Self {
        Self {
            deal_id: *claim.deal_id.as_uuid(),
            user_id: *claim.user_id.as_uuid(),
            created_at: claim.created_at,
            rating: claim.rating,
            comment: claim.comment.clone(),
            rated_at: claim.rated_at,
        }
    }
}

/// Request body for `POST /deals/{id}/claims/rating`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RateClaimRequest {
    /// Star rating in `[1, 5]`.
    pub rating: u8,
    /// Optional free-text comment.
    #[serde(default)]
    pub comment: Option<String>,
    /// Optional client-supplied rating timestamp; server time when absent.
    #[serde(default)]
    pub rated_at: Option<DateTime<Utc>>,
}
