//! Medicine-name autocomplete route.

use axum::{
    extract::{Query, State},
    Json,
};

use crate::errors::{ApiResponse, AppError};
use crate::models::medicine::{MedicineSuggestion, SuggestionQuery};
use crate::services::suggestion;
use crate::AppState;

/// GET /api/v1/suggestions?q= -- medicines and combinations matching a prefix.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<ApiResponse<Vec<MedicineSuggestion>>>, AppError> {
    let suggestions = suggestion::search(&state.db, &query.q).await?;
    Ok(ApiResponse::success(suggestions))
}
