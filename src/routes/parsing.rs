//! Prescription parsing API route.

use axum::{extract::State, Json};

use crate::errors::ApiResponse;
use crate::models::prescription::{ParseOutcome, ParseRequest};
use crate::services::prescription_parse;
use crate::AppState;

/// POST /api/v1/prescriptions/parse -- parse a free-text prescription line.
///
/// A failed parse is a normal outcome (`success: false`), not an error.
pub async fn parse(
    State(state): State<AppState>,
    Json(body): Json<ParseRequest>,
) -> Json<ApiResponse<ParseOutcome>> {
    let outcome = prescription_parse::parse_prescription(&state.parser, &state.ai, &body).await;
    ApiResponse::success(outcome)
}
