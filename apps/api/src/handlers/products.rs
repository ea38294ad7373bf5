//! Product CRUD and search endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use caja_core::validation::{validate_name, validate_sku, validate_unit_price};
use caja_core::{Capability, CoreError, Money, Product};

const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub sku: Option<String>,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub stock: i64,
}

impl ProductPayload {
    fn validate(&self) -> Result<(), ApiError> {
        validate_name(&self.name).map_err(CoreError::from)?;
        if let Some(sku) = &self.sku {
            validate_sku(sku).map_err(CoreError::from)?;
        }
        validate_unit_price(self.price).map_err(CoreError::from)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
}

/// GET /api/products?search=&limit=
pub async fn search(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    auth.require(Capability::CreateSales)?; // anyone at the register may browse

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let products = state.db.products().search(&params.search, limit).await?;
    Ok(Json(products))
}

/// POST /api/products
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    auth.require(Capability::ManageProducts)?;
    payload.validate()?;

    let product = state
        .db
        .products()
        .create(payload.sku, payload.name, payload.price, payload.stock)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /api/products/:id
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    auth.require(Capability::CreateSales)?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Product not found: {}", id)))?;
    Ok(Json(product))
}

/// PUT /api/products/:id
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, ApiError> {
    auth.require(Capability::ManageProducts)?;
    payload.validate()?;

    let product = state
        .db
        .products()
        .update(&id, payload.sku, payload.name, payload.price, payload.stock)
        .await?;
    Ok(Json(product))
}

/// POST /api/products/:id/stock
///
/// Relative adjustment: `{"delta": -3}` removes three units.
pub async fn adjust_stock(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StockAdjustment>,
) -> Result<Json<Product>, ApiError> {
    auth.require(Capability::ManageProducts)?;

    let product = state.db.products().adjust_stock(&id, req.delta).await?;
    Ok(Json(product))
}

/// DELETE /api/products/:id
///
/// Refused with 409 while sale lines still reference the product.
pub async fn remove(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require(Capability::ManageProducts)?;

    state.db.products().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
