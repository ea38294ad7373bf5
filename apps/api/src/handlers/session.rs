//! Register session endpoints.
//!
//! Open/close succeed only for the caller that performed the transition;
//! a no-op request ("open when already open") is rejected with 400 so a
//! client can tell "I opened the register" apart from "it was already
//! open".

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use caja_core::{Capability, SessionState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub changed: bool,
    #[serde(flatten)]
    pub state: SessionState,
}

/// GET /api/session
pub async fn current(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SessionState>, ApiError> {
    let session = state.db.session().current().await?;
    Ok(Json(session))
}

/// POST /api/session/open
pub async fn open(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    auth.require(Capability::ControlSession)?;

    let (changed, session) = state.db.session().open().await?;
    if !changed {
        return Err(ApiError::InvalidRequest(
            "Session is already open".to_string(),
        ));
    }
    Ok(Json(SessionResponse {
        changed,
        state: session,
    }))
}

/// POST /api/session/close
pub async fn close(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SessionResponse>, ApiError> {
    auth.require(Capability::ControlSession)?;

    let (changed, session) = state.db.session().close().await?;
    if !changed {
        return Err(ApiError::InvalidRequest(
            "Session is already closed".to_string(),
        ));
    }
    Ok(Json(SessionResponse {
        changed,
        state: session,
    }))
}
