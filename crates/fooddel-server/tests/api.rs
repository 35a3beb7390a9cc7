//! Router-level tests: requests go through the full axum stack against a
//! temporary SQLite database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use fooddel_core::FoodDelConfig;
use fooddel_server::{build_router, AppState};
use fooddel_store::SqliteStore;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = FoodDelConfig::from_env(dir.path()).unwrap();
        let store = SqliteStore::open(&config.data_paths.db).unwrap();
        let state = Arc::new(AppState::new(config, store));
        Self {
            router: build_router(state.clone()),
            state,
            _dir: dir,
        }
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Register an account and return its bearer token plus the response body.
    async fn register(&self, name: &str, email: &str, role: &str) -> (String, Value) {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": "secret123",
                    "phone_no": "9800000000",
                    "address": "Andheri West, Mumbai",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (body["token"].as_str().unwrap().to_string(), body)
    }

    async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }
}

/// A restaurant owner plus one customer order, already marked ready.
async fn ready_order(app: &TestApp) -> (String, i64) {
    let (owner, _) = app.register("Ravi", "ravi@example.com", "restaurant").await;
    let (customer, _) = app.register("Asha", "asha@example.com", "customer").await;

    let (_, restaurant) = app
        .send("GET", "/api/restaurants/owner/my-restaurant", Some(&owner), None)
        .await;
    let restaurant_id = restaurant["restaurant_id"].as_i64().unwrap();

    let (status, created) = app
        .send(
            "POST",
            "/api/orders",
            Some(&customer),
            Some(json!({
                "restaurant_id": restaurant_id,
                "items": [{ "menu_id": 1, "price": 100, "quantity": 2 }],
                "total_amount": 250.0,
                "delivery_address": "Powai, Mumbai",
                "payment_method": "upi",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = created["order_id"].as_i64().unwrap();

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/restaurants/owner/orders/{}/status", order_id),
            Some(&owner),
            Some(json!({ "status": "ready" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    (owner, order_id)
}

#[tokio::test]
async fn test_index_health_and_unknown_route() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/api", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Running");

    let (status, body) = app.send("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");

    let (status, body) = app.send("GET", "/api/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
    assert_eq!(body["path"], "/api/nowhere");
    assert_eq!(body["method"], "GET");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "Asha", "email": "asha@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");
    assert!(body["error"].is_string());

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Asha",
                "email": "not-an-email",
                "password": "secret123",
                "phone_no": "9800000000",
                "address": "Powai",
                "role": "customer",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.register("Asha", "asha@example.com", "customer").await;
    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Asha Again",
                "email": "asha@example.com",
                "password": "other",
                "phone_no": "9800000001",
                "address": "Powai",
                "role": "customer",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists with this email");
}

#[tokio::test]
async fn test_register_profiles_by_role() {
    let app = TestApp::new();

    let (_, body) = app.register("Ravi", "ravi@example.com", "restaurant").await;
    assert_eq!(body["restaurant"]["name"], "Ravi's Restaurant");
    assert_eq!(body["restaurant"]["location"], "Andheri West");
    assert_eq!(body["user"]["role"], "restaurant");
    assert!(body["user"].get("password_hash").is_none());

    let (token, body) = app.register("Kiran", "kiran@example.com", "delivery_agent").await;
    assert!(body["deliveryAgent"]["agent_id"].is_number());
    let (status, profile) = app
        .send("GET", "/api/delivery-agents/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "Kiran");
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new();
    app.register("Asha", "asha@example.com", "customer").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "asha@example.com", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "asha@example.com", "password": "secret123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.send("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "asha@example.com");
}

#[tokio::test]
async fn test_missing_invalid_and_expired_tokens() {
    let app = TestApp::new();
    let (status, body) = app.send("GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = app.send("GET", "/api/auth/me", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    app.register("Asha", "asha@example.com", "customer").await;
    let user = app
        .state
        .store
        .find_credentials_by_email("asha@example.com")
        .unwrap()
        .unwrap()
        .user;
    let issued = chrono::Utc::now() - chrono::Duration::hours(48);
    let stale = app
        .state
        .store
        .create_session(&user, issued, chrono::Duration::hours(24))
        .unwrap();
    let (status, _) = app.send("GET", "/api/auth/me", Some(&stale.token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_checks() {
    let app = TestApp::new();
    let (customer, _) = app.register("Asha", "asha@example.com", "customer").await;
    let (owner, _) = app.register("Ravi", "ravi@example.com", "restaurant").await;

    let (status, body) = app
        .send("GET", "/api/restaurants/owner/my-restaurant", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].is_string());

    let (status, _) = app
        .send("GET", "/api/orders/delivery/available", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send("GET", "/api/customers/profile", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_checkout_stores_client_total_and_items() {
    let app = TestApp::new();
    let (_, order_id) = ready_order(&app).await;
    let customer = app.login("asha@example.com").await;

    let (status, order) = app
        .send("GET", &format!("/api/orders/{}", order_id), Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["total_amount"], 250.0);
    assert_eq!(order["status"], "ready");
    assert_eq!(order["payment_method"], "upi");
    assert_eq!(order["customer_name"], "Asha");
    assert_eq!(order["items"].as_array().unwrap().len(), 1);
    assert_eq!(order["items"][0]["quantity"], 2);

    let (status, history) = app
        .send("GET", "/api/customers/orders", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["restaurant_name"], "Ravi's Restaurant");

    let (status, _) = app
        .send("GET", "/api/orders/99999", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_validation() {
    let app = TestApp::new();
    let (customer, _) = app.register("Asha", "asha@example.com", "customer").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/orders",
            Some(&customer),
            Some(json!({
                "restaurant_id": 1,
                "items": [{ "menu_id": 1, "price": 100 }],
                "total_amount": 145.0,
                "delivery_address": "Powai",
                "payment_method": "bitcoin",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "POST",
            "/api/orders",
            Some(&customer),
            Some(json!({
                "restaurant_id": 404,
                "items": [{ "menu_id": 1, "price": 100 }],
                "total_amount": 145.0,
                "delivery_address": "Powai",
                "payment_method": "cash",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("POST", "/api/orders", Some(&customer), Some(json!({ "items": [] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delivery_accept_once_then_deliver() {
    let app = TestApp::new();
    let (owner, order_id) = ready_order(&app).await;
    let (first, _) = app.register("Kiran", "kiran@example.com", "delivery_agent").await;
    let (second, _) = app.register("Sunil", "sunil@example.com", "delivery_agent").await;

    let (status, available) = app
        .send("GET", "/api/orders/delivery/available", Some(&first), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(available.as_array().unwrap().len(), 1);
    assert_eq!(available[0]["order_id"], order_id);

    let accept = format!("/api/orders/delivery/{}/accept", order_id);
    let (status, body) = app.send("POST", &accept, Some(&first), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "picked_up");

    let (status, _) = app.send("POST", &accept, Some(&second), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, available) = app
        .send("GET", "/api/delivery-agents/available-orders", Some(&second), None)
        .await;
    assert!(available.as_array().unwrap().is_empty());

    // Only the assigned agent can move the order
    let status_uri = format!("/api/orders/delivery/{}/status", order_id);
    let (status, _) = app
        .send("PUT", &status_uri, Some(&second), Some(json!({ "status": "delivered" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send("PUT", &status_uri, Some(&first), Some(json!({ "status": "delivered" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Delivery completed successfully");

    let (_, mine) = app
        .send("GET", "/api/delivery-agents/my-orders", Some(&first), None)
        .await;
    assert_eq!(mine[0]["status"], "delivered");
    assert!(mine[0]["delivery_time"].is_string());
    assert_eq!(mine[0]["delivery_agent_name"], "Kiran");

    // Delivered is terminal
    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/restaurants/owner/orders/{}/status", order_id),
            Some(&owner),
            Some(json!({ "status": "pending" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("delivered -> pending"));

    let (status, revenue) = app
        .send("GET", "/api/restaurants/owner/revenue", Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revenue["total"], 250.0);
    assert_eq!(revenue["monthly"], 250.0);
}

#[tokio::test]
async fn test_owner_status_update_rules() {
    let app = TestApp::new();
    let (owner, order_id) = ready_order(&app).await;
    let (other_owner, _) = app.register("Meera", "meera@example.com", "restaurant").await;

    let uri = format!("/api/restaurants/owner/orders/{}/status", order_id);

    let (status, _) = app
        .send("PUT", &uri, Some(&other_owner), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("PUT", &uri, Some(&owner), Some(json!({ "status": "teleported" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send("PUT", &uri, Some(&owner), Some(json!({ "status": "pending" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send("PUT", &uri, Some(&owner), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previous_status"], "ready");

    let (status, _) = app
        .send("PUT", &uri, Some(&owner), Some(json!({ "status": "ready" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_owner_cannot_pick_up_or_deliver() {
    let app = TestApp::new();
    let (owner, order_id) = ready_order(&app).await;
    let (agent, _) = app.register("Kiran", "kiran@example.com", "delivery_agent").await;

    let uri = format!("/api/restaurants/owner/orders/{}/status", order_id);
    for next in ["picked_up", "delivered"] {
        let (status, body) = app
            .send("PUT", &uri, Some(&owner), Some(json!({ "status": next })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT, "{}: {}", next, body);
    }

    let (_, order) = app
        .send("GET", &format!("/api/orders/{}", order_id), Some(&owner), None)
        .await;
    assert_eq!(order["status"], "ready");
    assert!(order["delivery_agent_id"].is_null());
    assert!(order["delivery_time"].is_null());

    // Still offered to agents
    let (_, available) = app
        .send("GET", "/api/orders/delivery/available", Some(&agent), None)
        .await;
    assert_eq!(available.as_array().unwrap().len(), 1);
    assert_eq!(available[0]["order_id"], order_id);
}

#[tokio::test]
async fn test_menu_management_is_scoped_to_owner() {
    let app = TestApp::new();
    let (owner, _) = app.register("Ravi", "ravi@example.com", "restaurant").await;
    let (other_owner, _) = app.register("Meera", "meera@example.com", "restaurant").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/restaurants/menu/items",
            Some(&owner),
            Some(json!({ "items": "Vada Pav", "price": 30, "types": "Veg", "cuisine": "Street Food" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let menu_id = body["item"]["menu_id"].as_i64().unwrap();
    let restaurant_id = body["item"]["restaurant_id"].as_i64().unwrap();

    let (status, _) = app
        .send("POST", "/api/menu", Some(&owner), Some(json!({ "items": "Misal" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/menu/{}", menu_id),
            Some(&other_owner),
            Some(json!({ "price": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(
            "PUT",
            &format!("/api/restaurants/menu/items/{}", menu_id),
            Some(&owner),
            Some(json!({ "price": 35 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["price"], 35.0);
    assert_eq!(body["item"]["items"], "Vada Pav");

    let (_, menu) = app
        .send("GET", &format!("/api/menu/restaurant/{}", restaurant_id), None, None)
        .await;
    assert_eq!(menu.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send("DELETE", &format!("/api/menu/{}", menu_id), Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, menu) = app
        .send("GET", &format!("/api/restaurants/{}/menu", restaurant_id), None, None)
        .await;
    assert!(menu.as_array().unwrap().is_empty());

    let (status, _) = app
        .send("DELETE", &format!("/api/menu/{}", menu_id), Some(&owner), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restaurant_catalog() {
    let app = TestApp::new();
    fooddel_store::seed::seed_sample_data(&app.state.store).unwrap();

    let (status, list) = app.send("GET", "/api/restaurants", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 8);

    let (status, one) = app.send("GET", "/api/restaurants/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one["name"], "Spice Kitchen");

    let (status, _) = app.send("GET", "/api/restaurants/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send("GET", "/api/restaurants/999/menu", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_profile() {
    let app = TestApp::new();
    let (asha, _) = app.register("Asha", "asha@example.com", "customer").await;
    let (vikram, _) = app.register("Vikram", "vikram@example.com", "customer").await;

    let (status, profile) = app
        .send("GET", "/api/customers/profile", Some(&asha), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "Asha");
    let asha_id = profile["customer_id"].as_i64().unwrap();

    let uri = format!("/api/customers/profile/{}", asha_id);
    let (status, _) = app
        .send("PUT", &uri, Some(&vikram), Some(json!({ "address": "Elsewhere" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send("PUT", &uri, Some(&asha), Some(json!({ "preferences": "vegetarian" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer"]["preferences"], "vegetarian");
    assert_eq!(body["customer"]["address"], "Andheri West, Mumbai");
}

#[tokio::test]
async fn test_payments() {
    let app = TestApp::new();
    let (_, order_id) = ready_order(&app).await;
    let (agent, _) = app.register("Kiran", "kiran@example.com", "delivery_agent").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/payments",
            Some(&agent),
            Some(json!({ "mode": "upi", "status": "pending", "order_id": order_id, "amount": 250.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let payment_id = body["id"].as_i64().unwrap();

    let (status, payment) = app
        .send("GET", &format!("/api/payments/order/{}", order_id), Some(&agent), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["tip"], 0.0);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/payments/{}/status", payment_id),
            Some(&agent),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, payment) = app
        .send("GET", &format!("/api/payments/order/{}", order_id), Some(&agent), None)
        .await;
    assert_eq!(payment["status"], "completed");

    let (status, _) = app
        .send(
            "PUT",
            "/api/payments/9999/status",
            Some(&agent),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("GET", "/api/payments/order/9999", Some(&agent), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
