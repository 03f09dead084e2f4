pub mod payment;

pub use payment::{CheckoutSession, GatewayError, NotificationEvent, PaymentGateway};
