//! Sale document endpoints: receipts and invoices.
//!
//! The two variants share handler bodies parameterized by
//! [`DocumentKind`]; the route table gives each its own path so the API
//! stays explicit about which document type a client is working with.
//!
//! Issuing a document requires the register session to be OPEN. The
//! check runs just before the sale transaction; a session closed in the
//! same instant can still let one sale through, which matches register
//! practice (the drawer closes after the in-flight customer is done).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use caja_core::{Capability, DocumentKind, NewSale, Sale};

const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

async fn create(
    auth: AuthUser,
    state: AppState,
    kind: DocumentKind,
    req: NewSale,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    auth.require(Capability::CreateSales)?;

    let session = state.db.session().current().await?;
    if !session.is_open {
        return Err(ApiError::Conflict(
            "Register session is closed".to_string(),
        ));
    }

    let sale = state
        .db
        .sales()
        .create_sale(kind, &auth.id, &req, state.config.allow_price_override)
        .await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

async fn get(
    auth: AuthUser,
    state: AppState,
    kind: DocumentKind,
    id: String,
) -> Result<Json<Sale>, ApiError> {
    auth.require(Capability::CreateSales)?;

    let sale = state
        .db
        .sales()
        .get(kind, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} not found: {}", kind.as_str(), id)))?;
    Ok(Json(sale))
}

async fn list(
    auth: AuthUser,
    state: AppState,
    kind: DocumentKind,
    limit: Option<u32>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    auth.require(Capability::CreateSales)?;

    let sales = state
        .db
        .sales()
        .list(kind, limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(sales))
}

async fn remove(
    auth: AuthUser,
    state: AppState,
    kind: DocumentKind,
    id: String,
) -> Result<StatusCode, ApiError> {
    auth.require(Capability::CreateSales)?;

    state.db.sales().delete(kind, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ====== Receipts ======

/// POST /api/receipts
pub async fn create_receipt(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NewSale>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    create(auth, state, DocumentKind::Receipt, req).await
}

/// GET /api/receipts/:id
pub async fn get_receipt(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    get(auth, state, DocumentKind::Receipt, id).await
}

/// GET /api/receipts?limit=
pub async fn list_receipts(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    list(auth, state, DocumentKind::Receipt, params.limit).await
}

/// DELETE /api/receipts/:id
pub async fn delete_receipt(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove(auth, state, DocumentKind::Receipt, id).await
}

// ====== Invoices ======

/// POST /api/invoices
pub async fn create_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NewSale>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    create(auth, state, DocumentKind::Invoice, req).await
}

/// GET /api/invoices/:id
pub async fn get_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    get(auth, state, DocumentKind::Invoice, id).await
}

/// GET /api/invoices?limit=
pub async fn list_invoices(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    list(auth, state, DocumentKind::Invoice, params.limit).await
}

/// DELETE /api/invoices/:id
pub async fn delete_invoice(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove(auth, state, DocumentKind::Invoice, id).await
}
