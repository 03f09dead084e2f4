use async_trait::async_trait;
use uuid::Uuid;
use verdant_core::{CheckoutSession, GatewayError, NotificationEvent, PaymentGateway};

/// Gateway double for tests and local development: sessions always open, and
/// webhook bodies are parsed without signature verification.
pub struct MockGateway;

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_session(
        &self,
        order_id: Uuid,
        _amount: i64,
        _owner_id: &str,
    ) -> Result<CheckoutSession, GatewayError> {
        Ok(CheckoutSession {
            id: format!("cs_mock_{}", order_id.simple()),
            url: format!("https://checkout.test/c/{}", order_id.simple()),
        })
    }

    fn verify_and_parse(
        &self,
        payload: &[u8],
        _signature_header: &str,
    ) -> Result<Option<NotificationEvent>, GatewayError> {
        crate::webhook::parse_event(payload)
    }
}
