//! Public restaurant catalog and the owner dashboard.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use super::menu;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use fooddel_core::Error;
use fooddel_store::{MenuItem, OrderStatus, OrderSummary, Restaurant, RevenueSummary, Role};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        // Catalog
        .route("/", get(list_restaurants))
        .route("/{id}", get(get_restaurant))
        .route("/{id}/menu", get(get_menu))
        // Owner
        .route("/owner/my-restaurant", get(my_restaurant))
        .route("/owner/orders", get(owner_orders))
        .route("/owner/revenue", get(owner_revenue))
        .route("/owner/orders/{order_id}/status", put(update_order_status))
        // Owner menu management
        .route("/menu/items", post(menu::create_item))
        .route(
            "/menu/items/{id}",
            put(menu::update_item).delete(menu::delete_item),
        )
}

/// The restaurant owned by a `restaurant` caller.
pub(crate) fn owned_restaurant(state: &AppState, auth: &AuthUser) -> ApiResult<Restaurant> {
    auth.require(Role::Restaurant)?;
    let restaurant = state
        .store
        .get_restaurant_by_owner(auth.user_id)?
        .ok_or_else(|| Error::NotFound("Restaurant not found for this user".into()))?;
    Ok(restaurant)
}

// ---------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------

async fn list_restaurants(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Restaurant>>> {
    Ok(Json(state.store.list_restaurants()?))
}

async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Restaurant>> {
    let restaurant = state
        .store
        .get_restaurant(id)?
        .ok_or_else(|| Error::NotFound("Restaurant not found".into()))?;
    Ok(Json(restaurant))
}

async fn get_menu(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    if state.store.get_restaurant(id)?.is_none() {
        return Err(Error::NotFound("Restaurant not found".into()).into());
    }
    Ok(Json(state.store.menu_for_restaurant(id)?))
}

// ---------------------------------------------------------------
// Owner
// ---------------------------------------------------------------

async fn my_restaurant(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Restaurant>> {
    Ok(Json(owned_restaurant(&state, &auth)?))
}

async fn owner_orders(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<OrderSummary>>> {
    let restaurant = owned_restaurant(&state, &auth)?;
    let orders = state.store.orders_for_restaurant(restaurant.restaurant_id)?;
    info!(
        "Found {} orders for restaurant {}",
        orders.len(),
        restaurant.restaurant_id
    );
    Ok(Json(orders))
}

async fn owner_revenue(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<RevenueSummary>> {
    let restaurant = owned_restaurant(&state, &auth)?;
    let today = chrono::Local::now().date_naive();
    Ok(Json(state.store.restaurant_revenue(restaurant.restaurant_id, today)?))
}

#[derive(Deserialize)]
pub(crate) struct StatusUpdate {
    pub status: Option<String>,
}

impl StatusUpdate {
    pub(crate) fn parse(&self) -> Result<OrderStatus, Error> {
        self.status
            .as_deref()
            .ok_or_else(|| Error::Validation("Status is required".into()))?
            .parse()
    }
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
    auth: AuthUser,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let restaurant = owned_restaurant(&state, &auth)?;
    let Json(body) = payload?;
    let status = body.parse()?;

    let belongs = state
        .store
        .get_order(order_id)?
        .is_some_and(|order| order.restaurant_id == restaurant.restaurant_id);
    if !belongs {
        return Err(Error::NotFound("Order not found".into()).into());
    }

    let previous = state.store.update_status(order_id, status)?;
    Ok(Json(serde_json::json!({
        "message": "Order status updated successfully",
        "order_id": order_id,
        "status": status,
        "previous_status": previous,
    })))
}
