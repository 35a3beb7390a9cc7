//! Bearer-token authentication and role checks.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use fooddel_core::Error;
use fooddel_store::Role;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// The caller behind a valid `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Reject callers whose role is not `role`.
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.role != role {
            debug!(
                "User {} with role {} denied {}-only route",
                self.user_id, self.role, role
            );
            return Err(Error::Forbidden(format!("Access denied. {} role required.", role)).into());
        }
        Ok(())
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::Unauthorized("Access denied. No token provided.".into()))?;

        let session = state
            .store
            .find_session(token, chrono::Utc::now())?
            .ok_or_else(|| Error::Unauthorized("Invalid or expired token".into()))?;

        Ok(Self {
            user_id: session.user_id,
            email: session.email,
            role: session.role,
        })
    }
}
