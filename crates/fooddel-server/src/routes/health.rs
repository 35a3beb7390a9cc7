//! Service banner and health check.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(api_index))
        .route("/health", get(health))
}

async fn api_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "FoodDel API",
        "status": "Running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth",
            "customers": "/api/customers",
            "restaurants": "/api/restaurants",
            "menu": "/api/menu",
            "orders": "/api/orders",
            "deliveryAgents": "/api/delivery-agents",
            "payments": "/api/payments",
            "health": "/api/health",
        },
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "FoodDel API is running",
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
