//! HTTP route handlers.
//!
//! One module per resource. All routes except `/health` and
//! `/api/auth/login` require a bearer token; write access is further
//! gated by role capabilities inside each handler.

pub mod auth;
pub mod products;
pub mod reports;
pub mod sales;
pub mod session;
pub mod users;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/products",
            get(products::search).post(products::create),
        )
        .route(
            "/api/products/:id",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/api/products/:id/stock", post(products::adjust_stock))
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/:id", axum::routing::put(users::update).delete(users::remove))
        .route(
            "/api/receipts",
            get(sales::list_receipts).post(sales::create_receipt),
        )
        .route(
            "/api/receipts/:id",
            get(sales::get_receipt).delete(sales::delete_receipt),
        )
        .route(
            "/api/invoices",
            get(sales::list_invoices).post(sales::create_invoice),
        )
        .route(
            "/api/invoices/:id",
            get(sales::get_invoice).delete(sales::delete_invoice),
        )
        .route("/api/session", get(session::current))
        .route("/api/session/open", post(session::open))
        .route("/api/session/close", post(session::close))
        .route("/api/reports/daily", get(reports::daily))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe: reports whether the store answers queries.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_ok = state.db.health_check().await;
    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
    }))
}

// =============================================================================
// Router Tests
// =============================================================================
