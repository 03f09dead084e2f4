use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;
use verdant_catalog::{CatalogReader, CatalogSnapshot, ProductQuote};
use verdant_order::{Order, OrderStore, PaymentState};

/// In-memory order store for tests and local development. Conditional
/// operations hold the map lock for the whole check-and-mutate, giving the
/// same atomicity the SQL statements provide.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<HashMap<Uuid, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.orders.lock().unwrap().insert(order.id, order.clone());
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn set_payment_state(
        &self,
        id: Uuid,
        expected: PaymentState,
        new: PaymentState,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get_mut(&id) {
            Some(order) if order.payment_state == expected => {
                order.payment_state = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_if(
        &self,
        id: Uuid,
        expected: PaymentState,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = self.orders.lock().unwrap();
        match orders.get(&id) {
            Some(order) if order.payment_state == expected => {
                orders.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.owner_id == owner_id && o.is_actionable())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.is_actionable())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}

/// Fixed-quote catalog for tests and local development.
#[derive(Default)]
pub struct MemoryCatalogReader {
    quotes: HashMap<Uuid, ProductQuote>,
}

impl MemoryCatalogReader {
    pub fn with_quotes(quotes: Vec<ProductQuote>) -> Self {
        Self {
            quotes: quotes.into_iter().map(|q| (q.id, q)).collect(),
        }
    }
}

#[async_trait]
impl CatalogReader for MemoryCatalogReader {
    async fn get_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<CatalogSnapshot, Box<dyn std::error::Error + Send + Sync>> {
        Ok(CatalogSnapshot::from_quotes(
            ids.iter()
                .filter_map(|id| self.quotes.get(id).cloned())
                .collect(),
        ))
    }
}
