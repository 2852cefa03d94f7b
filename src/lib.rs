//! # dealradar
//!
//! REST API gateway for a location-based flash-deals marketplace.
//!
//! Vendors publish short-lived deals pinned to coordinates; customers
//! discover them by proximity, claim them, rate them, and subscribe to
//! push notifications for new deals near a point. All serving state is
//! in-memory; PostgreSQL is an optional append-only event log.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── MarketService (service/)
//!     ├── EventBus (domain/)
//!     │       ├── NotificationDispatcher (notify/)
//!     │       └── EventLog writer (persistence/)
//!     │
//!     ├── DealStore / ClaimLedger / RatingAggregator (domain/)
//!     ├── SubscriptionIndex / VendorDirectory (domain/)
//!     │
//!     └── PostgreSQL event log (optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod service;
