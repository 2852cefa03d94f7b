//! dealradar server entry point.
//!
//! Starts the Axum HTTP server and the background notification and
//! event-log workers.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use dealradar::api;
use dealradar::app_state::AppState;
use dealradar::config::MarketConfig;
use dealradar::domain::{
    ClaimLedger, DealStore, EventBus, RatingAggregator, SubscriptionIndex, VendorDirectory,
};
use dealradar::notify::{MockPushGateway, NotificationDispatcher};
use dealradar::persistence::{self, EventLog};
use dealradar::service::{MarketService, MockContentGenerator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = MarketConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting dealradar");

    // Build domain layer
    let deals = Arc::new(DealStore::new());
    let claims = Arc::new(ClaimLedger::new());
    let vendors = Arc::new(VendorDirectory::new());
    let ratings = Arc::new(RatingAggregator::new(Arc::clone(&vendors)));
    let subscriptions = Arc::new(SubscriptionIndex::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let market = Arc::new(MarketService::new(
        deals,
        claims,
        ratings,
        Arc::clone(&subscriptions),
        vendors,
        Arc::new(MockContentGenerator::new()),
        event_bus.clone(),
    ));

    // Notification fan-out worker
    let dispatcher = NotificationDispatcher::new(subscriptions, MockPushGateway::new());
    let _notify_task = dispatcher.spawn(event_bus.subscribe());

    // Optional write-behind event log
    let event_log = if config.persistence_enabled {
        match init_event_log(&config).await {
            Ok(log) => {
                let _log_task = persistence::spawn_writer(log.clone(), event_bus.subscribe());
                Some(log)
            }
            Err(e) => {
                tracing::warn!(error = %e, "event log unavailable, continuing without persistence");
                None
            }
        }
    } else {
        None
    };

    // Build application state
    let app_state = AppState {
        market,
        event_bus,
        event_log,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Connects the event log and runs migrations.
async fn init_event_log(config: &MarketConfig) -> anyhow::Result<EventLog> {
    let log = EventLog::connect(
        &config.database_url,
        config.database_max_connections,
        Duration::from_secs(config.database_connect_timeout_secs),
    )?;
    log.run_migrations().await?;
    tracing::info!("event log connected and migrated");
    Ok(log)
}
