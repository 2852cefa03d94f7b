//! Domain layer: entities, stores, and the event system.
//!
//! Holds the marketplace domain model: deal, claim, rating, and
//! subscription entities with their concurrent stores, the pure
//! great-circle distance math both proximity queries share, the vendor
//! rating aggregate, and the broadcast event bus that decouples
//! notification fan-out from the request path.

pub mod claim_ledger;
pub mod deal;
pub mod deal_store;
pub mod event_bus;
pub mod geo;
pub mod ids;
pub mod market_event;
pub mod rating_aggregator;
pub mod subscription_index;
pub mod vendor_directory;

pub use claim_ledger::{Claim, ClaimLedger};
pub use deal::{Deal, DealCategory, DealStatus};
pub use deal_store::DealStore;
pub use event_bus::EventBus;
pub use geo::GeoPoint;
pub use ids::{DealId, SubscriptionId, UserId};
pub use market_event::MarketEvent;
pub use rating_aggregator::{RatingAggregator, RatingRecord};
pub use subscription_index::{Subscription, SubscriptionIndex};
pub use vendor_directory::{VendorAggregate, VendorDirectory};
