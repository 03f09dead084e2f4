pub mod manager;
pub mod models;
pub mod pricing;
pub mod reconcile;
pub mod repository;

pub use manager::{OrderError, OrderManager, Placement};
pub use models::{CartLine, Order, OrderLine, PaymentMethod, PaymentState};
pub use pricing::{compute_total, OrderQuote, PricingError};
pub use reconcile::{ReconcileError, ReconciliationHandler};
pub use repository::OrderStore;
