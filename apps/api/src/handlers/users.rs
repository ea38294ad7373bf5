//! User management endpoints. All of them require `ManageUsers`, which
//! only admins hold.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::auth::{hash_password, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;
use caja_core::validation::validate_username;
use caja_core::{Capability, CoreError, Role, User};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub role: Role,
    pub is_active: bool,
    /// When present, replaces the password.
    pub password: Option<String>,
}

/// GET /api/users
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    auth.require(Capability::ManageUsers)?;

    let users = state.db.users().list().await?;
    Ok(Json(users))
}

/// POST /api/users
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    auth.require(Capability::ManageUsers)?;

    let username = req.username.trim().to_string();
    validate_username(&username).map_err(CoreError::from)?;
    if req.password.is_empty() {
        return Err(ApiError::InvalidRequest("Password must not be empty".to_string()));
    }

    let hash = hash_password(&req.password)?;
    let user = state.db.users().create(username, hash, req.role).await?;

    info!(username = %user.username, role = %user.role.as_str(), created_by = %auth.username, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/:id
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    auth.require(Capability::ManageUsers)?;

    // Self-demotion lockout guard
    if id == auth.id && req.role != Role::Admin {
        return Err(ApiError::InvalidRequest(
            "Cannot remove your own admin role".to_string(),
        ));
    }
    if id == auth.id && !req.is_active {
        return Err(ApiError::InvalidRequest(
            "Cannot deactivate your own account".to_string(),
        ));
    }

    let hash = match &req.password {
        Some(p) if !p.is_empty() => Some(hash_password(p)?),
        Some(_) => {
            return Err(ApiError::InvalidRequest("Password must not be empty".to_string()));
        }
        None => None,
    };

    let user = state
        .db
        .users()
        .update(&id, req.role, req.is_active, hash)
        .await?;
    Ok(Json(user))
}

/// DELETE /api/users/:id
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require(Capability::ManageUsers)?;

    if id == auth.id {
        return Err(ApiError::InvalidRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    state.db.users().delete(&id).await?;
    info!(user_id = %id, deleted_by = %auth.username, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
