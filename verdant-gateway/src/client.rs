use crate::webhook;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;
use verdant_core::{CheckoutSession, GatewayError, NotificationEvent, PaymentGateway};

#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    /// Provider API base, e.g. `https://api.stripe.com`.
    pub api_base: String,
    pub secret_key: String,
    pub webhook_secret: String,
    pub success_url: String,
    pub cancel_url: String,
    pub currency: String,
    /// Bound on each gateway call; a timeout surfaces as `Unavailable`.
    pub timeout_seconds: u64,
}

/// Payment gateway backed by Stripe Checkout over bare REST.
pub struct StripeGateway {
    http: reqwest::Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(
        &self,
        order_id: Uuid,
        amount: i64,
        owner_id: &str,
    ) -> Result<CheckoutSession, GatewayError> {
        let order_id_str = order_id.to_string();
        let amount_str = amount.to_string();
        let item_name = format!("Order {order_id_str}");

        let form: [(&str, &str); 9] = [
            ("mode", "payment"),
            ("client_reference_id", owner_id),
            ("line_items[0][price_data][currency]", self.config.currency.as_str()),
            ("line_items[0][price_data][unit_amount]", amount_str.as_str()),
            ("line_items[0][price_data][product_data][name]", item_name.as_str()),
            ("line_items[0][quantity]", "1"),
            ("metadata[order_id]", order_id_str.as_str()),
            ("success_url", self.config.success_url.as_str()),
            ("cancel_url", self.config.cancel_url.as_str()),
        ];

        let resp: serde_json::Value = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.config.api_base))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        match (resp["id"].as_str(), resp["url"].as_str()) {
            (Some(id), Some(url)) => Ok(CheckoutSession {
                id: id.to_string(),
                url: url.to_string(),
            }),
            _ => Err(GatewayError::Unavailable(format!(
                "checkout session creation failed: {resp}"
            ))),
        }
    }

    fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<Option<NotificationEvent>, GatewayError> {
        webhook::verify_signature(payload, signature_header, &self.config.webhook_secret)?;
        webhook::parse_event(payload)
    }
}
