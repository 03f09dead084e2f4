use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use verdant_order::{Order, OrderLine, OrderStore, PaymentMethod, PaymentState};

/// Postgres-backed order store.
///
/// Payment-state mutations are single conditional statements (`... WHERE
/// payment_state = $expected`), so concurrent reconciliation events race in
/// the database, not in this process.
pub struct SqlOrderStore {
    pool: PgPool,
}

impl SqlOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    owner_id: String,
    address_id: String,
    total_amount: i64,
    payment_method: String,
    payment_state: String,
    gateway_session_id: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    product_id: Uuid,
    quantity: i32,
    unit_price: i64,
}

impl SqlOrderStore {
    async fn hydrate(
        &self,
        row: OrderRow,
    ) -> Result<Order, Box<dyn std::error::Error + Send + Sync>> {
        let line_rows: Vec<OrderLineRow> = sqlx::query_as(
            "SELECT product_id, quantity, unit_price FROM order_lines WHERE order_id = $1 ORDER BY position",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        let payment_method = PaymentMethod::parse(&row.payment_method)
            .ok_or_else(|| format!("unknown payment method: {}", row.payment_method))?;
        let payment_state = PaymentState::parse(&row.payment_state)
            .ok_or_else(|| format!("unknown payment state: {}", row.payment_state))?;

        Ok(Order {
            id: row.id,
            owner_id: row.owner_id,
            address_id: row.address_id,
            lines: line_rows
                .into_iter()
                .map(|l| OrderLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
            total_amount: row.total_amount,
            payment_method,
            payment_state,
            gateway_session_id: row.gateway_session_id,
            created_at: row.created_at,
        })
    }

    async fn list_ids(
        &self,
        owner_id: Option<&str>,
    ) -> Result<Vec<Uuid>, Box<dyn std::error::Error + Send + Sync>> {
        // Visibility rule: COD orders plus paid Online orders.
        let ids: Vec<Uuid> = match owner_id {
            Some(owner) => {
                sqlx::query_scalar(
                    "SELECT id FROM orders
                     WHERE owner_id = $1
                       AND (payment_method = 'CASH_ON_DELIVERY' OR payment_state = 'PAID')
                     ORDER BY created_at DESC",
                )
                .bind(owner)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT id FROM orders
                     WHERE payment_method = 'CASH_ON_DELIVERY' OR payment_state = 'PAID'
                     ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(ids)
    }

    async fn fetch_orders(
        &self,
        ids: Vec<Uuid>,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let mut orders = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(order) = self.get(id).await? {
                orders.push(order);
            }
        }
        Ok(orders)
    }
}

#[async_trait]
impl OrderStore for SqlOrderStore {
    async fn create(
        &self,
        order: &Order,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, owner_id, address_id, total_amount, payment_method, payment_state, gateway_session_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.id)
        .bind(&order.owner_id)
        .bind(&order.address_id)
        .bind(order.total_amount)
        .bind(order.payment_method.as_str())
        .bind(order.payment_state.as_str())
        .bind(order.gateway_session_id.as_deref())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, position, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order.id)
            .bind(position as i32)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, owner_id, address_id, total_amount, payment_method, payment_state, gateway_session_id, created_at
             FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn set_payment_state(
        &self,
        id: Uuid,
        expected: PaymentState,
        new: PaymentState,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            "UPDATE orders SET payment_state = $1 WHERE id = $2 AND payment_state = $3",
        )
        .bind(new.as_str())
        .bind(id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_if(
        &self,
        id: Uuid,
        expected: PaymentState,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // order_lines go with the order via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND payment_state = $2")
            .bind(id)
            .bind(expected.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let ids = self.list_ids(Some(owner_id)).await?;
        self.fetch_orders(ids).await
    }

    async fn list_all(&self) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let ids = self.list_ids(None).await?;
        self.fetch_orders(ids).await
    }
}
