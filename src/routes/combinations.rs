//! Combination medicine API routes.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::models::combination::{
    CombinationMedicine, ObserveMedicineName, ObserveResult, UpsertCombination, UpsertResult,
};
use crate::models::pagination::{PagedResult, Pagination};
use crate::services::combination;
use crate::AppState;

/// GET /api/v1/combinations -- list combinations with pagination.
pub async fn list(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<PagedResult<CombinationMedicine>>>, AppError> {
    let result = combination::list(&state.db, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/combinations -- create or replace a combination by name.
pub async fn upsert(
    State(state): State<AppState>,
    Json(body): Json<UpsertCombination>,
) -> Result<Json<ApiResponse<UpsertResult>>, AppError> {
    let result = combination::upsert(&state.db, &body).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/combinations/observe -- register the combination behind a finalized medicine name.
pub async fn observe(
    State(state): State<AppState>,
    Json(body): Json<ObserveMedicineName>,
) -> Result<Json<ApiResponse<ObserveResult>>, AppError> {
    let result = combination::observe_medicine_name(&state.db, &body.medicine_name).await?;
    Ok(ApiResponse::success(result))
}
