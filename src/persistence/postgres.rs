//! PostgreSQL implementation of the market event log.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::models::StoredMarketEvent;
use crate::domain::MarketEvent;
use crate::error::MarketError;

/// PostgreSQL-backed append-only event log using `sqlx::PgPool`.
///
/// The log is strictly write-behind: the HTTP path publishes to the
/// in-process event bus and never waits on the database. A dedicated
/// writer task drains the bus into this log.
#[derive(Debug, Clone)]
pub struct EventLog {
    pool: PgPool,
}

impl EventLog {
    /// Creates an event log over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily-connecting pool for the given database URL.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::PersistenceError`] when the URL cannot be
    /// parsed. Connection failures surface later, on first use.
    pub fn connect(
        database_url: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, MarketError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect_lazy(database_url)
            .map_err(|e| MarketError::PersistenceError(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Runs the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::PersistenceError`] when the database is
    /// unreachable or a migration fails.
    pub async fn run_migrations(&self) -> Result<(), MarketError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MarketError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Appends one event to the log and returns its row ID.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::PersistenceError`] on serialization or
    /// database failure.
    pub async fn append(&self, event: &MarketEvent) -> Result<i64, MarketError> {
        let payload = serde_json::to_value(event)
            .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO market_events (event_type, payload) VALUES ($1, $2) RETURNING id",
        )
        .bind(event.event_type_str())
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(id)
    }

    /// Loads the most recent events, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::PersistenceError`] on database failure.
    pub async fn recent(&self, limit: i64) -> Result<Vec<StoredMarketEvent>, MarketError> {
        let rows = sqlx::query_as::<_, (i64, String, serde_json::Value, chrono::DateTime<chrono::Utc>)>(
            "SELECT id, event_type, payload, created_at FROM market_events \
             ORDER BY id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MarketError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, event_type, payload, created_at)| StoredMarketEvent {
                id,
                event_type,
                payload,
                created_at,
            })
            .collect())
    }
}

/// Spawns the write-behind task draining the event bus into the log.
///
/// Append failures are logged and skipped; a slow database can lag the
/// bus and lose log rows, never block publishers.
pub fn spawn_writer(
    log: EventLog,
    mut rx: broadcast::Receiver<MarketEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Err(e) = log.append(&event).await {
                        tracing::warn!(error = %e, "failed to persist market event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event log writer lagged behind the bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::info!("event log writer stopped");
    })
}
