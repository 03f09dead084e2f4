use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;
use verdant_core::{GatewayError, NotificationEvent};

/// Header carrying the webhook signature, `t=<unix>,v1=<hex hmac>`.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Events older than this are rejected to prevent replay.
const REPLAY_TOLERANCE_SECONDS: i64 = 300;

/// Verify a webhook signature (HMAC-SHA256 over `"{timestamp}.{payload}"`).
pub fn verify_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), GatewayError> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err(GatewayError::InvalidSignature("invalid signature header"));
    }

    let signed_payload = format!("{timestamp}.{}", std::str::from_utf8(payload).unwrap_or(""));
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| GatewayError::InvalidSignature("hmac key error"))?;
    mac.update(signed_payload.as_bytes());

    // Decode hex signature and use constant-time comparison via verify_slice
    let sig_bytes =
        hex::decode(signature).map_err(|_| GatewayError::InvalidSignature("invalid hex"))?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| GatewayError::InvalidSignature("signature mismatch"))?;

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| GatewayError::InvalidSignature("invalid timestamp"))?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > REPLAY_TOLERANCE_SECONDS {
        return Err(GatewayError::InvalidSignature("timestamp outside tolerance"));
    }

    Ok(())
}

/// Parse an already-authenticated event body.
///
/// Returns `Ok(None)` for event kinds this system does not handle; the caller
/// acknowledges them so the gateway moves on.
pub fn parse_event(payload: &[u8]) -> Result<Option<NotificationEvent>, GatewayError> {
    let event: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| GatewayError::MalformedPayload(e.to_string()))?;

    let event_type = event["type"]
        .as_str()
        .ok_or_else(|| GatewayError::MalformedPayload("missing event type".into()))?;

    match event_type {
        "checkout.session.completed" => {
            let (session_id, order_id) = session_fields(&event)?;
            Ok(Some(NotificationEvent::PaymentCompleted {
                session_id,
                order_id,
            }))
        }
        "checkout.session.expired" => {
            let (session_id, order_id) = session_fields(&event)?;
            Ok(Some(NotificationEvent::PaymentSessionExpired {
                session_id,
                order_id,
            }))
        }
        other => {
            tracing::debug!(event_type = other, "unhandled webhook event type");
            Ok(None)
        }
    }
}

fn session_fields(event: &serde_json::Value) -> Result<(String, Uuid), GatewayError> {
    let obj = event
        .get("data")
        .and_then(|d| d.get("object"))
        .ok_or_else(|| GatewayError::MalformedPayload("missing data.object".into()))?;

    let session_id = obj["id"]
        .as_str()
        .ok_or_else(|| GatewayError::MalformedPayload("missing session id".into()))?;

    let order_id = obj
        .get("metadata")
        .and_then(|m| m["order_id"].as_str())
        .ok_or_else(|| GatewayError::MalformedPayload("missing metadata.order_id".into()))?;
    let order_id = Uuid::parse_str(order_id)
        .map_err(|_| GatewayError::MalformedPayload("order_id is not a uuid".into()))?;

    Ok((session_id.to_string(), order_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{}", std::str::from_utf8(payload).unwrap()).as_bytes());
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn completed_body(order_id: Uuid) -> Vec<u8> {
        serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_123",
                "metadata": { "order_id": order_id.to_string() }
            }}
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let body = completed_body(Uuid::new_v4());
        let header = sign(SECRET, chrono::Utc::now().timestamp(), &body);
        verify_signature(&body, &header, SECRET).unwrap();
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let body = completed_body(Uuid::new_v4());
        let header = sign(SECRET, chrono::Utc::now().timestamp(), &body);

        let mut tampered = body.clone();
        let pos = tampered.len() - 10;
        tampered[pos] ^= 1;

        let err = verify_signature(&tampered, &header, SECRET).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSignature(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = completed_body(Uuid::new_v4());
        let header = sign("whsec_other", chrono::Utc::now().timestamp(), &body);
        let err = verify_signature(&body, &header, SECRET).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSignature(_)));
    }

    #[test]
    fn test_garbage_header_rejected() {
        let body = completed_body(Uuid::new_v4());
        let err = verify_signature(&body, "not-a-signature", SECRET).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSignature(_)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let body = completed_body(Uuid::new_v4());
        let header = sign(SECRET, chrono::Utc::now().timestamp() - 3600, &body);
        let err = verify_signature(&body, &header, SECRET).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSignature(_)));
    }

    #[test]
    fn test_parse_completed_event() {
        let order_id = Uuid::new_v4();
        let event = parse_event(&completed_body(order_id)).unwrap().unwrap();
        assert_eq!(
            event,
            NotificationEvent::PaymentCompleted {
                session_id: "cs_123".into(),
                order_id,
            }
        );
    }

    #[test]
    fn test_parse_expired_event() {
        let order_id = Uuid::new_v4();
        let body = serde_json::json!({
            "id": "evt_2",
            "type": "checkout.session.expired",
            "data": { "object": {
                "id": "cs_456",
                "metadata": { "order_id": order_id.to_string() }
            }}
        })
        .to_string();

        let event = parse_event(body.as_bytes()).unwrap().unwrap();
        assert_eq!(
            event,
            NotificationEvent::PaymentSessionExpired {
                session_id: "cs_456".into(),
                order_id,
            }
        );
    }

    #[test]
    fn test_unrecognized_event_ignored() {
        let body = serde_json::json!({
            "id": "evt_3",
            "type": "invoice.paid",
            "data": { "object": { "id": "in_789" } }
        })
        .to_string();

        assert!(parse_event(body.as_bytes()).unwrap().is_none());
    }

    #[test]
    fn test_missing_order_metadata_is_malformed() {
        let body = serde_json::json!({
            "id": "evt_4",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_123", "metadata": {} } }
        })
        .to_string();

        let err = parse_event(body.as_bytes()).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedPayload(_)));
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let err = parse_event(b"not json").unwrap_err();
        assert!(matches!(err, GatewayError::MalformedPayload(_)));
    }
}
