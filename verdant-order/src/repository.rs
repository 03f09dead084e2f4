use crate::models::{Order, PaymentState};
use async_trait::async_trait;
use uuid::Uuid;

/// Durable storage for orders, the single source of truth for payment state.
///
/// `set_payment_state` and `delete_if` are atomic conditional operations
/// executed in the store itself (compare-and-set on the current state), not
/// read-modify-write from the caller's side. That is what makes the
/// reconciliation handlers safe under concurrent, out-of-order notification
/// delivery.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// Atomically set the payment state if the current state matches
    /// `expected`. Returns whether a row was updated.
    async fn set_payment_state(
        &self,
        id: Uuid,
        expected: PaymentState,
        new: PaymentState,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Atomically delete the order if its current state matches `expected`.
    /// Returns whether a row was deleted.
    async fn delete_if(
        &self,
        id: Uuid,
        expected: PaymentState,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Orders visible to an owner: COD orders plus Online orders that have
    /// been paid. Pending Online orders stay hidden until reconciliation.
    async fn list_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// All visible orders, for the admin/seller view. Same visibility rule
    /// as `list_for_owner`.
    async fn list_all(&self) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;
}
