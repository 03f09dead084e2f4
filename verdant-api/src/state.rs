use std::sync::Arc;
use verdant_core::PaymentGateway;
use verdant_order::{OrderManager, ReconciliationHandler};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<OrderManager>,
    pub reconciler: Arc<ReconciliationHandler>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub auth: AuthConfig,
}
