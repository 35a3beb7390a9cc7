//! Checkout, order details, and the delivery workflow.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, warn};

use super::delivery::agent_for;
use super::restaurants::StatusUpdate;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use fooddel_core::Error;
use fooddel_store::{NewOrder, NewOrderItem, OrderDetails, OrderStatus, OrderSummary, PaymentMethod, Role};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_order))
        .route("/{id}", get(get_order))
        .route("/delivery/available", get(available))
        .route("/delivery/{order_id}/accept", post(accept))
        .route("/delivery/{order_id}/status", put(update_delivery_status))
}

#[derive(Deserialize)]
struct CreateOrderRequest {
    restaurant_id: Option<i64>,
    #[serde(default)]
    items: Vec<NewOrderItem>,
    total_amount: Option<f64>,
    delivery_address: Option<String>,
    payment_method: Option<String>,
}

// ---------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------

async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(req) = payload?;

    let delivery_address = req
        .delivery_address
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let (Some(restaurant_id), Some(total_amount), Some(delivery_address), Some(payment_method)) = (
        req.restaurant_id,
        req.total_amount,
        delivery_address,
        req.payment_method.as_deref(),
    ) else {
        return Err(Error::Validation(
            "restaurant_id, total_amount, delivery_address and payment_method are required".into(),
        )
        .into());
    };
    if req.items.is_empty() {
        return Err(Error::Validation("Order must contain at least one item".into()).into());
    }
    if !total_amount.is_finite() || total_amount < 0.0 {
        return Err(Error::Validation("total_amount must be a non-negative number".into()).into());
    }
    let payment_method: PaymentMethod = payment_method.parse()?;

    if state.store.get_restaurant(restaurant_id)?.is_none() {
        return Err(Error::NotFound("Restaurant not found".into()).into());
    }

    let user = state
        .store
        .get_user(auth.user_id)?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
    let customer = state.store.get_or_create_customer(&user)?;

    let order = state.store.create_order(&NewOrder {
        customer_id: customer.customer_id,
        restaurant_id,
        total_amount,
        delivery_address: delivery_address.to_string(),
        payment_method,
        placed_at: chrono::Local::now().naive_local(),
    })?;

    let mut body = serde_json::json!({
        "success": true,
        "message": "Order created successfully!",
        "order_id": order.order_id,
        "status": order.status,
    });

    // The order stands even when its lines fail to save.
    if let Err(e) = state.store.add_order_items(order.order_id, &req.items) {
        warn!("Order {} created but items failed to save: {}", order.order_id, e);
        body["message"] =
            "Order created successfully, but there was an issue saving order details".into();
        body["warning"] = "Some order details may not be saved correctly".into();
    }

    Ok((StatusCode::CREATED, Json(body)))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    _auth: AuthUser,
) -> ApiResult<Json<OrderDetails>> {
    let details = state
        .store
        .get_order_details(id)?
        .ok_or_else(|| Error::NotFound("Order not found".into()))?;
    Ok(Json(details))
}

// ---------------------------------------------------------------
// Delivery workflow
// ---------------------------------------------------------------

async fn available(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<OrderSummary>>> {
    auth.require(Role::DeliveryAgent)?;
    Ok(Json(state.store.available_for_delivery()?))
}

async fn accept(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    let agent = agent_for(&state, &auth)?;
    state.store.assign_delivery_agent(order_id, agent.agent_id)?;
    info!("Order {} accepted by agent {}", order_id, agent.agent_id);
    Ok(Json(serde_json::json!({
        "message": "Order accepted successfully",
        "order_id": order_id,
        "status": OrderStatus::PickedUp,
    })))
}

async fn update_delivery_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
    auth: AuthUser,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let agent = agent_for(&state, &auth)?;
    let Json(body) = payload?;
    let status = body.parse()?;

    let assigned = state
        .store
        .get_order(order_id)?
        .is_some_and(|order| order.delivery_agent_id == Some(agent.agent_id));
    if !assigned {
        return Err(Error::NotFound("Order not found".into()).into());
    }

    let message = if status == OrderStatus::Delivered {
        state
            .store
            .complete_delivery(order_id, chrono::Local::now().naive_local())?;
        "Delivery completed successfully"
    } else {
        state.store.update_status(order_id, status)?;
        "Order status updated successfully"
    };

    Ok(Json(serde_json::json!({
        "message": message,
        "order_id": order_id,
        "status": status,
    })))
}
