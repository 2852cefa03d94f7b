//! Request and response DTOs for the REST API.
//!
//! Mapping between DTOs and domain types is explicit `From` impls; the
//! domain entities never leak transport concerns.

pub mod claim_dto;
pub mod deal_dto;
pub mod notification_dto;
pub mod rating_dto;

pub use claim_dto::{ClaimResponse, RateClaimRequest};
pub use deal_dto::{
    CreateDealRequest, DealListResponse, DealResponse, NearbyDealsResponse, NearbyParams,
    PaginationMeta, PaginationParams,
};
pub use notification_dto::{
    SubscribeRequest, SubscriptionListResponse, SubscriptionResponse, UnsubscribeParams,
};
pub use rating_dto::{RateDealRequest, RatingResponse, VendorRatingDto};
