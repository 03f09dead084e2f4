use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};

use crate::state::AppState;
use verdant_gateway::SIGNATURE_HEADER;

pub fn routes() -> Router<AppState> {
    Router::new().route("/payments/webhook", post(handle_webhook))
}

/// POST /payments/webhook
/// Receive payment-session outcomes from the gateway.
///
/// Must receive the raw body (not parsed JSON) for HMAC signature
/// verification. Status codes drive the gateway's retry policy: 400 means
/// the notification is rejected outright and must not be retried, 200 means
/// durably applied (or safely ignorable), 500 means retry later.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    // 1. Get the signature header
    let sig_header = match headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(s) => s,
        None => {
            tracing::warn!("Missing webhook signature header");
            return StatusCode::BAD_REQUEST;
        }
    };

    // 2. Verify and parse before trusting anything in the body
    let event = match state.gateway.verify_and_parse(&body, sig_header) {
        Ok(Some(event)) => event,
        Ok(None) => {
            // Authentic but unhandled event kind; acknowledge and move on.
            return StatusCode::OK;
        }
        Err(err) => {
            tracing::warn!(error = %err, "Webhook rejected");
            return StatusCode::BAD_REQUEST;
        }
    };

    // 3. Apply through the reconciliation handler; only acknowledge once the
    //    mutation has durably succeeded.
    match state.reconciler.handle(event).await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::error!(error = %err, "Reconciliation failed, gateway will retry");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
