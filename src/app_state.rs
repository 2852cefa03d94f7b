//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::persistence::EventLog;
use crate::service::MarketService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Market service for all business logic.
    pub market: Arc<MarketService>,
    /// Event bus feeding the notification dispatcher and the event log.
    pub event_bus: EventBus,
    /// Durable event log, when persistence is configured.
    pub event_log: Option<EventLog>,
}
