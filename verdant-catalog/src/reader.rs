use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Current price and stock status of one product, as reported by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductQuote {
    pub id: Uuid,
    /// Selling price in minor currency units.
    pub offer_price: i64,
    pub in_stock: bool,
}

/// A point-in-time view of the catalog for a specific set of products.
///
/// Pricing works only off a snapshot, never the live catalog, so an order's
/// captured prices cannot shift mid-placement.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    quotes: HashMap<Uuid, ProductQuote>,
}

impl CatalogSnapshot {
    pub fn from_quotes(quotes: Vec<ProductQuote>) -> Self {
        Self {
            quotes: quotes.into_iter().map(|q| (q.id, q)).collect(),
        }
    }

    pub fn get(&self, product_id: &Uuid) -> Option<&ProductQuote> {
        self.quotes.get(product_id)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Read-only access to the product catalog. The order core never writes it.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Fetch a fresh price/stock snapshot for the given products. Products
    /// unknown to the catalog are simply absent from the result.
    async fn get_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<CatalogSnapshot, Box<dyn std::error::Error + Send + Sync>>;
}
