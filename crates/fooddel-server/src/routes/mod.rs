//! HTTP route handlers, one module per resource under `/api`.

pub mod auth;
pub mod customers;
pub mod delivery;
pub mod health;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod restaurants;

use std::sync::Arc;

use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .nest("/auth", auth::routes())
        .nest("/customers", customers::routes())
        .nest("/restaurants", restaurants::routes())
        .nest("/menu", menu::routes())
        .nest("/orders", orders::routes())
        .nest("/delivery-agents", delivery::routes())
        .nest("/payments", payments::routes())
}

async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "message": "Route not found",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
}
