//! Service layer: orchestration and content generation seams.

pub mod content;
pub mod market_service;

pub use content::{ContentGenerator, GeneratedCopy, MockContentGenerator};
pub use market_service::{MarketService, NewDeal, DEFAULT_SEARCH_RADIUS_METERS};
