//! Route handlers.
//!
//! Every narrowing route takes a row id in the path; the lookup service
//! re-derives the group key from that row.

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::debug;

use deal_index::{DealLookupApi, DealView, RowId, VERSION};

use crate::domain::error::ApiError;

/// Shared lookup handle injected into every handler.
pub type AppState = Arc<dyn DealLookupApi>;

fn row_id(path: Result<Path<RowId>, PathRejection>) -> Result<RowId, ApiError> {
    let Path(id) = path?;
    Ok(id)
}

/// `GET /provinces`
pub async fn list_regions(State(api): State<AppState>) -> Response {
    Json(api.list_regions()).into_response()
}

/// `GET /cities/:id`
pub async fn list_sub_regions(
    State(api): State<AppState>,
    path: Result<Path<RowId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = row_id(path)?;
    Ok(Json(api.list_sub_regions(id)?).into_response())
}

/// `GET /complexes/:id`
pub async fn list_complexes(
    State(api): State<AppState>,
    path: Result<Path<RowId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = row_id(path)?;
    Ok(Json(api.list_complexes(id)?).into_response())
}

/// `GET /deals/:id`
pub async fn resolve_complex_rows(
    State(api): State<AppState>,
    path: Result<Path<RowId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = row_id(path)?;
    let slice = api.resolve_complex_rows(id)?;
    debug!(row_id = id, start = slice.start, len = slice.len(), "Resolved complex");
    Ok(Json(DealView::from_slice(&slice)).into_response())
}

/// `GET /districts/:id/deals`
pub async fn resolve_sub_region_rows(
    State(api): State<AppState>,
    path: Result<Path<RowId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = row_id(path)?;
    let slice = api.resolve_sub_region_rows(id)?;
    Ok(Json(DealView::from_slice(&slice)).into_response())
}

/// `GET /deal/:id`
pub async fn get_record(
    State(api): State<AppState>,
    path: Result<Path<RowId>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = row_id(path)?;
    let record = api.get_record(id)?;
    Ok(Json(DealView { id, record }).into_response())
}

/// `GET /health`
pub async fn health_check(State(api): State<AppState>) -> impl IntoResponse {
    let stats = api.stats();
    Json(serde_json::json!({
        "status": "healthy",
        "service": "deal-gateway",
        "version": VERSION,
        "records": stats.records,
        "regions": stats.regions,
        "sub_regions": stats.sub_regions,
        "complexes": stats.complexes,
    }))
}
