//! Persistence layer: optional PostgreSQL append-only event log.
//!
//! All serving state lives in memory; the event log is an observability
//! sink, not a source of truth, and the service runs fully without it.

pub mod models;
pub mod postgres;

pub use models::StoredMarketEvent;
pub use postgres::{EventLog, spawn_writer};
