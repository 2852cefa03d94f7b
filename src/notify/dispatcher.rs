//! Asynchronous notification fan-out worker.
//!
//! [`NotificationDispatcher`] consumes [`MarketEvent`]s from the event bus
//! on its own task: the request that published the event has already
//! returned by the time any matching or delivery work happens here.
//! Delivery failures are logged and dropped; nothing propagates back to
//! the triggering caller and nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::gateway::PushGateway;
use crate::domain::{GeoPoint, MarketEvent, SubscriptionIndex, UserId};

/// Title used for proximity notifications about a new deal.
const DEAL_TITLE: &str = "New Deal Nearby!";

/// Title used for rating notifications sent to the vendor.
const RATING_TITLE: &str = "Rating Received!";

/// Fan-out worker matching events to subscriptions and handing them to
/// the push gateway.
#[derive(Debug)]
pub struct NotificationDispatcher<G> {
    subscriptions: Arc<SubscriptionIndex>,
    gateway: G,
}

impl<G: PushGateway> NotificationDispatcher<G> {
    /// Creates a dispatcher over the given subscription index and gateway.
    #[must_use]
    pub fn new(subscriptions: Arc<SubscriptionIndex>, gateway: G) -> Self {
        Self {
            subscriptions,
            gateway,
        }
    }

    /// Spawns the worker loop on its own task, consuming events from `rx`
    /// until the bus closes.
    pub fn spawn(self, rx: broadcast::Receiver<MarketEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(rx))
    }

    async fn run(self, mut rx: broadcast::Receiver<MarketEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => self.dispatch(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification dispatcher lagged; events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("notification dispatcher stopped");
    }

    /// Handles a single event. Public so tests can drive the dispatcher
    /// without the worker loop.
    pub async fn dispatch(&self, event: MarketEvent) {
        match event {
            MarketEvent::DealPublished {
                title, lat, lon, ..
            } => self.on_deal_published(GeoPoint::new(lat, lon), &title).await,
            MarketEvent::RatingRecorded {
                vendor_id,
                deal_title,
                rating,
                ..
            } => self.on_rating_recorded(vendor_id, &deal_title, rating).await,
        }
    }

    /// Matches active subscriptions around the deal's location and sends
    /// one batch notification. On success, every matched subscription gets
    /// its `last_notification_sent` stamped; on failure we log and stop.
    async fn on_deal_published(&self, at: GeoPoint, title: &str) {
        let matched = self.subscriptions.find_matching(at).await;
        if matched.is_empty() {
            tracing::debug!(lat = at.lat, lon = at.lon, "no subscriptions in range");
            return;
        }

        let tokens: Vec<String> = matched.iter().map(|sub| sub.token.clone()).collect();
        let body = format!("Check out: {title}");

        if self.gateway.send_batch(&tokens, DEAL_TITLE, &body).await {
            let now = Utc::now();
            for sub in &matched {
                self.subscriptions.mark_notified(sub.id, now).await;
            }
            tracing::info!(subscribers = matched.len(), "deal notification delivered");
        } else {
            tracing::warn!(
                subscribers = matched.len(),
                "deal notification delivery failed"
            );
        }
    }

    /// Sends an individual rating notification to each of the vendor's own
    /// active subscriptions. Sends are independent: one failure does not
    /// stop the rest, and each success stamps only its own subscription.
    async fn on_rating_recorded(&self, vendor_id: UserId, title: &str, rating: u8) {
        let subscriptions = self.subscriptions.find_by_user(vendor_id).await;
        let active: Vec<_> = subscriptions.into_iter().filter(|sub| sub.active).collect();
        if active.is_empty() {
            tracing::debug!(%vendor_id, "vendor has no active subscriptions");
            return;
        }

        let body = format!("Your event '{title}' received a {rating}-star rating");
        for sub in active {
            if self.gateway.send_single(&sub.token, RATING_TITLE, &body).await {
                self.subscriptions.mark_notified(sub.id, Utc::now()).await;
            } else {
                tracing::warn!(%vendor_id, subscription_id = %sub.id, "rating notification delivery failed");
            }
        }
    }
}
