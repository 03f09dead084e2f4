use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use verdant_catalog::{CatalogReader, CatalogSnapshot, ProductQuote};

/// Postgres-backed catalog reader. The order core only ever reads price and
/// stock; catalog maintenance happens elsewhere.
pub struct SqlCatalogReader {
    pool: PgPool,
}

impl SqlCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct QuoteRow {
    id: Uuid,
    offer_price: i64,
    in_stock: bool,
}

#[async_trait]
impl CatalogReader for SqlCatalogReader {
    async fn get_by_ids(
        &self,
        ids: &[Uuid],
    ) -> Result<CatalogSnapshot, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<QuoteRow> =
            sqlx::query_as("SELECT id, offer_price, in_stock FROM products WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;

        Ok(CatalogSnapshot::from_quotes(
            rows.into_iter()
                .map(|r| ProductQuote {
                    id: r.id,
                    offer_price: r.offer_price,
                    in_stock: r.in_stock,
                })
                .collect(),
        ))
    }
}
