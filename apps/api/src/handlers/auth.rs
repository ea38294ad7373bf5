//! Login endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::verify_password;
use crate::error::ApiError;
use crate::state::AppState;
use caja_core::Role;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

/// POST /api/auth/login
///
/// Unknown username, wrong password, and deactivated account all return
/// the same 401 so the response does not leak which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let rejected = || ApiError::AuthFailed("Invalid credentials".to_string());

    let user = state
        .db
        .users()
        .find_by_username(req.username.trim())
        .await?
        .ok_or_else(|| {
            warn!(username = %req.username, "Login attempt for unknown user");
            rejected()
        })?;

    if !user.is_active || !verify_password(&req.password, &user.password_hash) {
        warn!(username = %user.username, "Login rejected");
        return Err(rejected());
    }

    let token = state
        .jwt
        .generate_token(&user.id, &user.username, user.role)?;

    info!(username = %user.username, role = %user.role.as_str(), "Login successful");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
        role: user.role,
    }))
}
