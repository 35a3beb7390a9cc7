//! Payment records.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use fooddel_core::Error;
use fooddel_store::{NewPayment, Payment};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_payment))
        .route("/customer/{customer_id}", get(customer_payments))
        .route("/order/{order_id}", get(order_payment))
        .route("/{id}/status", put(update_status))
}

#[derive(Deserialize)]
struct PaymentStatusUpdate {
    status: Option<String>,
}

async fn create_payment(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    payload: Result<Json<NewPayment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(new) = payload?;
    if new.mode.trim().is_empty() || new.status.trim().is_empty() {
        return Err(Error::Validation("Payment mode and status are required".into()).into());
    }

    let payment = state.store.create_payment(&new)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Payment created successfully",
            "id": payment.payment_id,
            "payment": payment,
        })),
    ))
}

async fn customer_payments(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<Payment>>> {
    Ok(Json(state.store.payments_for_customer(customer_id)?))
}

async fn order_payment(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
    _auth: AuthUser,
) -> ApiResult<Json<Payment>> {
    let payment = state
        .store
        .payment_for_order(order_id)?
        .ok_or_else(|| Error::NotFound("Payment not found".into()))?;
    Ok(Json(payment))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    _auth: AuthUser,
    payload: Result<Json<PaymentStatusUpdate>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(body) = payload?;
    let status = body
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Validation("Status is required".into()))?;

    state.store.update_payment_status(id, status)?;
    Ok(Json(serde_json::json!({ "message": "Payment status updated successfully" })))
}
