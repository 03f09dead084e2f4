use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an order settles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CashOnDelivery,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "CASH_ON_DELIVERY",
            PaymentMethod::Online => "ONLINE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CASH_ON_DELIVERY" => Some(PaymentMethod::CashOnDelivery),
            "ONLINE" => Some(PaymentMethod::Online),
            _ => None,
        }
    }
}

/// Settlement state. Transitions at most once, Unpaid → Paid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Unpaid,
    Paid,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Unpaid => "UNPAID",
            PaymentState::Paid => "PAID",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNPAID" => Some(PaymentState::Unpaid),
            "PAID" => Some(PaymentState::Paid),
            _ => None,
        }
    }
}

/// One entry of a client-submitted cart. Carries no price; the server prices
/// every line from a fresh catalog snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A priced order line. `unit_price` is captured at creation time and never
/// recomputed, so historical orders are immune to later catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Minor currency units per unit at order time.
    pub unit_price: i64,
}

/// The durable record of a placed purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub owner_id: String,
    pub address_id: String,
    pub lines: Vec<OrderLine>,
    /// Subtotal plus tax, minor currency units. Computed once at creation.
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_state: PaymentState,
    /// Correlation handle for the gateway checkout session. Online orders
    /// only; never reused across orders.
    pub gateway_session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        owner_id: String,
        address_id: String,
        payment_method: PaymentMethod,
        lines: Vec<OrderLine>,
        total_amount: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            address_id,
            lines,
            total_amount,
            payment_method,
            payment_state: PaymentState::Unpaid,
            gateway_session_id: None,
            created_at: Utc::now(),
        }
    }

    /// Whether fulfillment may proceed: COD orders are actionable while
    /// Unpaid, Online orders only once Paid.
    pub fn is_actionable(&self) -> bool {
        match self.payment_method {
            PaymentMethod::CashOnDelivery => true,
            PaymentMethod::Online => self.payment_state == PaymentState::Paid,
        }
    }
}
