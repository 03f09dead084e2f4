use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{self, Claims};
use crate::state::AppState;
use verdant_order::{CartLine, Order, PaymentMethod};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Optional; must match the authenticated user unless the caller is an
    /// admin. The server never trusts it for pricing.
    pub owner_id: Option<String>,
    pub address_id: String,
    pub lines: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
pub struct PlaceCodResponse {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PlaceOnlineResponse {
    pub order_id: Uuid,
    pub checkout_url: String,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub owner_id: Option<String>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(state: AppState) -> Router<AppState> {
    let customer = Router::new()
        .route("/orders/cod", post(place_cod))
        .route("/orders/online", post(place_online))
        .route("/orders", get(list_orders))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let admin = Router::new()
        .route("/orders/{id}/mark-paid", put(mark_paid))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::admin_auth_middleware,
        ));

    customer.merge(admin)
}

// ============================================================================
// Handlers
// ============================================================================

fn resolve_owner(claims: &Claims, requested: Option<&str>) -> Result<String, AppError> {
    match requested {
        Some(owner) if owner != claims.sub && !auth::is_admin(claims) => Err(
            AppError::AuthorizationError("cannot act on behalf of another user".to_string()),
        ),
        Some(owner) => Ok(owner.to_string()),
        None => Ok(claims.sub.clone()),
    }
}

/// POST /orders/cod
/// Place a cash-on-delivery order; actionable immediately.
async fn place_cod(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceCodResponse>, AppError> {
    let owner = resolve_owner(&claims, req.owner_id.as_deref())?;

    let placement = state
        .manager
        .place_order(
            &owner,
            &req.address_id,
            req.lines,
            PaymentMethod::CashOnDelivery,
        )
        .await?;

    Ok(Json(PlaceCodResponse {
        order_id: placement.order.id,
    }))
}

/// POST /orders/online
/// Place an online-payment order and hand back the checkout URL.
async fn place_online(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOnlineResponse>, AppError> {
    let owner = resolve_owner(&claims, req.owner_id.as_deref())?;

    let placement = state
        .manager
        .place_order(&owner, &req.address_id, req.lines, PaymentMethod::Online)
        .await?;

    let checkout_url = placement.checkout_url.ok_or_else(|| {
        AppError::InternalServerError("online placement produced no checkout url".to_string())
    })?;

    Ok(Json(PlaceOnlineResponse {
        order_id: placement.order.id,
        checkout_url,
    }))
}

/// GET /orders?owner_id=
/// Customers see their own visible orders; admins may scope to any owner or
/// list everything.
async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<OrdersResponse>, AppError> {
    let orders = if auth::is_admin(&claims) {
        match query.owner_id {
            Some(owner) => state.manager.orders_for_owner(&owner).await?,
            None => state.manager.all_orders().await?,
        }
    } else {
        let owner = resolve_owner(&claims, query.owner_id.as_deref())?;
        state.manager.orders_for_owner(&owner).await?
    };

    Ok(Json(OrdersResponse { orders }))
}

/// PUT /orders/{id}/mark-paid
/// Admin-only manual override, e.g. reconciling a COD payment on delivery.
async fn mark_paid(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OkResponse>, AppError> {
    state.manager.mark_paid(order_id).await?;
    Ok(Json(OkResponse { ok: true }))
}
