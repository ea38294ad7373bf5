//! Reporting endpoints.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use caja_core::Capability;
use caja_db::DailyReport;

#[derive(Debug, Deserialize)]
pub struct DailyParams {
    /// Calendar day as YYYY-MM-DD; defaults to today (UTC).
    pub date: Option<NaiveDate>,
}

/// GET /api/reports/daily?date=YYYY-MM-DD
pub async fn daily(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DailyParams>,
) -> Result<Json<DailyReport>, ApiError> {
    auth.require(Capability::ViewReports)?;

    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
    let report = state.db.sales().daily_report(date).await?;
    Ok(Json(report))
}
