use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A checkout session opened with the payment provider.
///
/// `id` is the provider's opaque correlation handle (e.g. cs_123); `url` is
/// where the customer completes payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Asynchronous notification from the payment gateway about a session outcome.
///
/// Delivery is at-least-once and unordered; both variants can arrive for the
/// same order, in either order, multiple times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    PaymentCompleted { session_id: String, order_id: Uuid },
    PaymentSessionExpired { session_id: String, order_id: Uuid },
}

impl NotificationEvent {
    pub fn order_id(&self) -> Uuid {
        match self {
            NotificationEvent::PaymentCompleted { order_id, .. } => *order_id,
            NotificationEvent::PaymentSessionExpired { order_id, .. } => *order_id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),

    #[error("invalid webhook signature: {0}")]
    InvalidSignature(&'static str),

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session for an order with the provider.
    ///
    /// `amount` is in minor currency units. The provider must echo `order_id`
    /// back in every notification about the session.
    async fn create_session(
        &self,
        order_id: Uuid,
        amount: i64,
        owner_id: &str,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Authenticate an inbound notification and parse it.
    ///
    /// The raw body must be verified against the shared webhook secret before
    /// any embedded data is trusted. Returns `Ok(None)` for authentic events
    /// of a kind this system does not handle.
    fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<Option<NotificationEvent>, GatewayError>;
}
