//! Push notification gateway boundary.
//!
//! [`PushGateway`] is the external delivery collaborator: it accepts
//! opaque device tokens plus title/body and reports success or failure.
//! This core never retries deliveries; a `false` outcome is logged by the
//! dispatcher and dropped. The bundled [`MockPushGateway`] stands in for a
//! real push provider and always succeeds.

/// External push delivery boundary.
///
/// Implementations must be cheap to share across tasks; the dispatcher
/// awaits each send inline on its own worker task.
pub trait PushGateway: Send + Sync + 'static {
    /// Delivers one notification to a batch of device tokens.
    ///
    /// Returns `true` when the whole batch was accepted by the provider.
    fn send_batch(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
    ) -> impl Future<Output = bool> + Send;

    /// Delivers one notification to a single device token.
    ///
    /// Returns `true` when the provider accepted the message.
    fn send_single(&self, token: &str, title: &str, body: &str)
    -> impl Future<Output = bool> + Send;
}

/// Logging stand-in for a real push provider. Always reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPushGateway;

impl MockPushGateway {
    /// Creates a new mock gateway.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PushGateway for MockPushGateway {
    async fn send_batch(&self, tokens: &[String], title: &str, body: &str) -> bool {
        tracing::info!(
            token_count = tokens.len(),
            title,
            body,
            "mock push batch delivered"
        );
        true
    }

    async fn send_single(&self, token: &str, title: &str, body: &str) -> bool {
        tracing::info!(token, title, body, "mock push delivered");
        true
    }
}
