//! Registration, login, and the current-user lookup.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;
use fooddel_core::Error;
use fooddel_store::credentials::{hash_password, verify_password};
use fooddel_store::{NewUser, Role, User};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

// ---------------------------------------------------------------
// Request types
// ---------------------------------------------------------------

#[derive(Deserialize)]
struct RegisterRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    phone_no: Option<String>,
    address: Option<String>,
    role: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// Trimmed, non-empty field value.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------

async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(req) = payload?;

    let (Some(name), Some(email), Some(password), Some(phone_no), Some(address), Some(role)) = (
        present(&req.name),
        present(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
        present(&req.phone_no),
        present(&req.address),
        present(&req.role),
    ) else {
        return Err(Error::Validation("All fields are required".into()).into());
    };

    if !EMAIL_RE.is_match(email) {
        return Err(Error::Validation("Please provide a valid email address".into()).into());
    }
    let role: Role = role.parse()?;

    if state.store.email_exists(email)? {
        return Err(Error::Validation("User already exists with this email".into()).into());
    }

    let password_hash = hash_password(password)?;
    let registered = state.store.register_user(&NewUser {
        name: name.to_string(),
        email: email.to_string(),
        phone_no: phone_no.to_string(),
        address: address.to_string(),
        role,
        password_hash,
    })?;

    let session = state.store.create_session(
        &registered.user,
        chrono::Utc::now(),
        state.config.token_ttl(),
    )?;
    info!("Registered user {} as {}", registered.user.id, role);

    let message = match role {
        Role::Restaurant => "Restaurant owner registered successfully! New restaurant created!",
        _ => "User registered successfully!",
    };

    let mut body = serde_json::json!({
        "message": message,
        "token": session.token,
        "user": registered.user,
    });
    if let Some(restaurant) = registered.restaurant {
        body["restaurant"] = serde_json::to_value(restaurant).map_err(Error::from)?;
    }
    if let Some(agent) = registered.delivery_agent {
        body["deliveryAgent"] = serde_json::to_value(agent).map_err(Error::from)?;
    }

    Ok((StatusCode::CREATED, Json(body)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(req) = payload?;

    let (Some(email), Some(password)) = (present(&req.email), req.password.as_deref()) else {
        return Err(Error::Validation("Email and password are required".into()).into());
    };

    let invalid = || Error::Validation("Invalid email or password".into());
    let credentials = state.store.find_credentials_by_email(email)?.ok_or_else(invalid)?;
    if !verify_password(password, &credentials.password_hash) {
        return Err(invalid().into());
    }

    let session = state.store.create_session(
        &credentials.user,
        chrono::Utc::now(),
        state.config.token_ttl(),
    )?;
    info!("User {} logged in", credentials.user.id);

    Ok(Json(serde_json::json!({
        "message": "Login successful!",
        "token": session.token,
        "user": credentials.user,
    })))
}

async fn me(State(state): State<Arc<AppState>>, user: AuthUser) -> ApiResult<Json<serde_json::Value>> {
    let user: User = state
        .store
        .get_user(user.user_id)?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
    Ok(Json(serde_json::json!({ "user": user })))
}
