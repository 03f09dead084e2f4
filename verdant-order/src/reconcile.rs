use crate::manager::{OrderError, OrderManager};
use std::sync::Arc;
use verdant_core::NotificationEvent;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The mutation could not be applied durably. Surfaced so the gateway's
    /// own retry policy re-delivers the notification.
    #[error("order store failure: {0}")]
    Store(String),
}

/// Applies gateway notifications to orders through the lifecycle manager.
///
/// Every mutation it performs is idempotent and conditionally atomic, so
/// duplicate and out-of-order delivery of the same events is safe. A result
/// of `Ok(())` means the event is fully applied (or safely ignorable) and
/// must be acknowledged; `Err` means the gateway should retry.
pub struct ReconciliationHandler {
    manager: Arc<OrderManager>,
}

impl ReconciliationHandler {
    pub fn new(manager: Arc<OrderManager>) -> Self {
        Self { manager }
    }

    pub async fn handle(&self, event: NotificationEvent) -> Result<(), ReconcileError> {
        match event {
            NotificationEvent::PaymentCompleted {
                session_id,
                order_id,
            } => match self.manager.mark_paid(order_id).await {
                Ok(()) => Ok(()),
                Err(OrderError::NotFound(_)) => {
                    // The gateway references an order this system never
                    // created (or one already expired). Acknowledge so it
                    // stops retrying.
                    tracing::warn!(
                        order_id = %order_id,
                        session_id = %session_id,
                        "payment completed for unknown order, acknowledging"
                    );
                    Ok(())
                }
                Err(err) => Err(ReconcileError::Store(err.to_string())),
            },
            NotificationEvent::PaymentSessionExpired {
                session_id,
                order_id,
            } => {
                tracing::debug!(
                    order_id = %order_id,
                    session_id = %session_id,
                    "payment session expired"
                );
                self.manager
                    .expire_unpaid(order_id)
                    .await
                    .map_err(|err| ReconcileError::Store(err.to_string()))
            }
        }
    }
}
