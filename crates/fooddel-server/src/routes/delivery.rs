//! Delivery agent profile and order lists.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use fooddel_core::Error;
use fooddel_store::{DeliveryAgent, OrderSummary, Role};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(profile))
        .route("/my-orders", get(my_orders))
        .route("/available-orders", get(available_orders))
}

/// The agent profile of a `delivery_agent` caller.
pub(crate) fn agent_for(state: &AppState, auth: &AuthUser) -> ApiResult<DeliveryAgent> {
    auth.require(Role::DeliveryAgent)?;
    let agent = state
        .store
        .get_agent_by_user(auth.user_id)?
        .ok_or_else(|| Error::NotFound("Delivery agent profile not found".into()))?;
    Ok(agent)
}

async fn profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<DeliveryAgent>> {
    Ok(Json(agent_for(&state, &auth)?))
}

async fn my_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<OrderSummary>>> {
    let agent = agent_for(&state, &auth)?;
    Ok(Json(state.store.orders_for_agent(agent.agent_id)?))
}

async fn available_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<OrderSummary>>> {
    auth.require(Role::DeliveryAgent)?;
    Ok(Json(state.store.available_for_delivery()?))
}
