use crate::models::{CartLine, Order, PaymentMethod, PaymentState};
use crate::pricing::{self, PricingError};
use crate::repository::OrderStore;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use verdant_catalog::CatalogReader;
use verdant_core::{CheckoutSession, GatewayError, PaymentGateway};

/// Result of a successful placement. `checkout_url` is present for Online
/// orders and is where the customer completes payment.
#[derive(Debug, Clone)]
pub struct Placement {
    pub order: Order,
    pub checkout_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("invalid cart: {0}")]
    InvalidCart(String),

    #[error("product {0} is unavailable")]
    ProductUnavailable(Uuid),

    #[error("payment service unavailable, try again")]
    GatewayUnavailable,

    #[error("order not found: {0}")]
    NotFound(Uuid),

    #[error("internal failure: {0}")]
    Internal(String),
}

impl From<PricingError> for OrderError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidCart(reason) => OrderError::InvalidCart(reason),
            PricingError::ProductUnavailable(id) => OrderError::ProductUnavailable(id),
        }
    }
}

fn internal(err: Box<dyn std::error::Error + Send + Sync>) -> OrderError {
    OrderError::Internal(err.to_string())
}

/// Owns order creation and the per-order state machine.
///
/// Orders enter through `place_order` only. Online orders move Unpaid → Paid
/// via `mark_paid` or get deleted pre-payment via `expire_unpaid`; COD orders
/// stay Unpaid and are actionable immediately.
pub struct OrderManager {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogReader>,
    gateway: Arc<dyn PaymentGateway>,
    tax_basis_points: i64,
    session_attempts: u32,
}

impl OrderManager {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogReader>,
        gateway: Arc<dyn PaymentGateway>,
        tax_basis_points: i64,
        session_attempts: u32,
    ) -> Self {
        Self {
            store,
            catalog,
            gateway,
            tax_basis_points,
            session_attempts: session_attempts.max(1),
        }
    }

    /// Validate, price from a fresh catalog snapshot, and persist an order.
    ///
    /// For Online orders the gateway session is created before anything is
    /// persisted: if the gateway stays down through the bounded retries, the
    /// placement fails with no order written. There is never a persisted
    /// Online order that lacks a session to be paid through.
    pub async fn place_order(
        &self,
        owner_id: &str,
        address_id: &str,
        lines: Vec<CartLine>,
        method: PaymentMethod,
    ) -> Result<Placement, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::InvalidCart("cart is empty".into()));
        }
        if address_id.trim().is_empty() {
            return Err(OrderError::InvalidCart("delivery address is required".into()));
        }

        let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let snapshot = self.catalog.get_by_ids(&ids).await.map_err(internal)?;

        let quote = pricing::compute_total(&lines, &snapshot, self.tax_basis_points)?;

        let mut order = Order::new(
            owner_id.to_string(),
            address_id.to_string(),
            method,
            quote.lines,
            quote.total,
        );

        let checkout_url = match method {
            PaymentMethod::CashOnDelivery => None,
            PaymentMethod::Online => {
                let session = self
                    .create_session_with_retry(order.id, order.total_amount, owner_id)
                    .await?;
                order.gateway_session_id = Some(session.id);
                Some(session.url)
            }
        };

        self.store.create(&order).await.map_err(internal)?;
        tracing::info!(
            order_id = %order.id,
            owner_id = %order.owner_id,
            method = order.payment_method.as_str(),
            total = order.total_amount,
            "order placed"
        );

        Ok(Placement {
            order,
            checkout_url,
        })
    }

    async fn create_session_with_retry(
        &self,
        order_id: Uuid,
        amount: i64,
        owner_id: &str,
    ) -> Result<CheckoutSession, OrderError> {
        for attempt in 1..=self.session_attempts {
            match self.gateway.create_session(order_id, amount, owner_id).await {
                Ok(session) => return Ok(session),
                Err(GatewayError::Unavailable(reason)) => {
                    tracing::warn!(
                        order_id = %order_id,
                        attempt,
                        reason = %reason,
                        "gateway session creation failed"
                    );
                    if attempt < self.session_attempts {
                        tokio::time::sleep(Duration::from_millis(100 * u64::from(attempt))).await;
                    }
                }
                Err(other) => return Err(OrderError::Internal(other.to_string())),
            }
        }
        Err(OrderError::GatewayUnavailable)
    }

    /// Mark an order paid. Idempotent: marking an already-paid order is a
    /// no-op. Fails with `NotFound` only when the order does not exist.
    pub async fn mark_paid(&self, order_id: Uuid) -> Result<(), OrderError> {
        let updated = self
            .store
            .set_payment_state(order_id, PaymentState::Unpaid, PaymentState::Paid)
            .await
            .map_err(internal)?;

        if updated {
            tracing::info!(order_id = %order_id, "order marked paid");
            return Ok(());
        }

        match self.store.get(order_id).await.map_err(internal)? {
            Some(_) => {
                // Already paid; duplicate delivery of a completion event.
                tracing::debug!(order_id = %order_id, "mark_paid no-op, already paid");
                Ok(())
            }
            None => Err(OrderError::NotFound(order_id)),
        }
    }

    /// Delete an order whose gateway session expired, but only while it is
    /// still Unpaid. The conditional delete runs in the store, so a
    /// concurrent `mark_paid` that lands first makes this a no-op; a Paid
    /// order is never deleted.
    pub async fn expire_unpaid(&self, order_id: Uuid) -> Result<(), OrderError> {
        let deleted = self
            .store
            .delete_if(order_id, PaymentState::Unpaid)
            .await
            .map_err(internal)?;

        if deleted {
            tracing::info!(order_id = %order_id, "unpaid order deleted after session expiry");
        } else {
            tracing::debug!(order_id = %order_id, "expiry skipped, order paid or already gone");
        }
        Ok(())
    }

    pub async fn orders_for_owner(&self, owner_id: &str) -> Result<Vec<Order>, OrderError> {
        self.store.list_for_owner(owner_id).await.map_err(internal)
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderError> {
        self.store.list_all().await.map_err(internal)
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        self.store.get(order_id).await.map_err(internal)
    }
}
