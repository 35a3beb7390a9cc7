//! Menu browsing and owner-side menu item management.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use super::restaurants::owned_restaurant;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use fooddel_core::Error;
use fooddel_store::{MenuItem, MenuItemUpdate, NewMenuItem};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/restaurant/{restaurant_id}", get(menu_for_restaurant))
        .route("/", post(create_item))
        .route("/{id}", put(update_item).delete(delete_item))
}

#[derive(Deserialize)]
pub(crate) struct CreateItemRequest {
    items: Option<String>,
    price: Option<f64>,
    types: Option<String>,
    cuisine: Option<String>,
}

async fn menu_for_restaurant(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<i64>,
) -> ApiResult<Json<Vec<MenuItem>>> {
    Ok(Json(state.store.menu_for_restaurant(restaurant_id)?))
}

/// A menu item of the caller's restaurant; items of other restaurants are
/// reported as missing.
fn owned_item(state: &AppState, auth: &AuthUser, id: i64) -> ApiResult<MenuItem> {
    let restaurant = owned_restaurant(state, auth)?;
    let item = state
        .store
        .get_menu_item(id)?
        .filter(|item| item.restaurant_id == restaurant.restaurant_id)
        .ok_or_else(|| Error::NotFound("Menu item not found".into()))?;
    Ok(item)
}

pub(crate) async fn create_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let restaurant = owned_restaurant(&state, &auth)?;
    let Json(req) = payload?;

    let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
    let (Some(items), Some(price), Some(types), Some(cuisine)) = (
        non_empty(req.items),
        req.price,
        non_empty(req.types),
        non_empty(req.cuisine),
    ) else {
        return Err(Error::Validation(
            "All fields are required: items, price, types, cuisine".into(),
        )
        .into());
    };
    if !price.is_finite() || price < 0.0 {
        return Err(Error::Validation("Price must be a non-negative number".into()).into());
    }

    let item = state.store.add_menu_item(&NewMenuItem {
        restaurant_id: restaurant.restaurant_id,
        items,
        price,
        types,
        cuisine,
    })?;
    info!(
        "Menu item {} added to restaurant {}",
        item.menu_id, restaurant.restaurant_id
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Menu item created successfully",
            "item": item,
        })),
    ))
}

pub(crate) async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    auth: AuthUser,
    payload: Result<Json<MenuItemUpdate>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    owned_item(&state, &auth, id)?;
    let Json(update) = payload?;
    if update.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(Error::Validation("Price must be a non-negative number".into()).into());
    }

    state.store.update_menu_item(id, &update)?;
    let item = state.store.get_menu_item(id)?;
    Ok(Json(serde_json::json!({
        "message": "Menu item updated successfully",
        "item": item,
    })))
}

pub(crate) async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    auth: AuthUser,
) -> ApiResult<Json<serde_json::Value>> {
    owned_item(&state, &auth, id)?;
    state.store.delete_menu_item(id)?;
    info!("Menu item {} deleted", id);
    Ok(Json(serde_json::json!({ "message": "Menu item deleted successfully" })))
}
