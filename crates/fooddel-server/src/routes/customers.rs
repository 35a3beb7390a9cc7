//! Customer profile and order history.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use fooddel_core::Error;
use fooddel_store::{Customer, CustomerUpdate, OrderSummary, Role};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile/{id}", put(update_profile))
        .route("/orders", get(list_orders))
}

/// The caller's customer profile, created from the account on first access.
fn profile_for(state: &AppState, auth: &AuthUser) -> ApiResult<Customer> {
    let user = state
        .store
        .get_user(auth.user_id)?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
    Ok(state.store.get_or_create_customer(&user)?)
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Customer>> {
    auth.require(Role::Customer)?;
    Ok(Json(profile_for(&state, &auth)?))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
    auth: AuthUser,
    payload: Result<Json<CustomerUpdate>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    auth.require(Role::Customer)?;
    let Json(update) = payload?;

    let own = profile_for(&state, &auth)?;
    if own.customer_id != customer_id {
        return Err(Error::Forbidden("You can only update your own profile".into()).into());
    }

    state.store.update_customer(customer_id, &update)?;
    info!("Customer {} updated profile", customer_id);

    let customer = profile_for(&state, &auth)?;
    Ok(Json(serde_json::json!({
        "message": "Profile updated successfully",
        "customer": customer,
    })))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<OrderSummary>>> {
    auth.require(Role::Customer)?;
    let orders = match state.store.get_customer_by_user(auth.user_id)? {
        Some(customer) => state.store.orders_for_customer(customer.customer_id)?,
        None => Vec::new(),
    };
    Ok(Json(orders))
}
