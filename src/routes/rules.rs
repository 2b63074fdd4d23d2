//! Smart parsing rule API routes.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::models::parsing_rule::{
    ApplyRulesRequest, CreateSmartParsingRule, RuleFieldType, SmartParsingRule,
    UpdateSmartParsingRule,
};
use crate::services::parsing_rule;
use crate::services::rule_engine::RuleApplication;
use crate::AppState;

/// GET /api/v1/parsing-rules -- list all rules, highest priority first.
pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SmartParsingRule>>>, AppError> {
    let rules = parsing_rule::list_rules(&state.db).await?;
    Ok(ApiResponse::success(rules))
}

/// GET /api/v1/parsing-rules/active/{field_type} -- active rules of one field in evaluation order.
pub async fn list_active_rules(
    State(state): State<AppState>,
    Path(field_type): Path<RuleFieldType>,
) -> Result<Json<ApiResponse<Vec<SmartParsingRule>>>, AppError> {
    let rules = parsing_rule::list_active_rules(&state.db, field_type).await?;
    Ok(ApiResponse::success(rules))
}

/// POST /api/v1/parsing-rules -- create a rule.
pub async fn create_rule(
    State(state): State<AppState>,
    Json(body): Json<CreateSmartParsingRule>,
) -> Result<Json<ApiResponse<SmartParsingRule>>, AppError> {
    let rule = parsing_rule::create_rule(&state.db, &body).await?;
    Ok(ApiResponse::success(rule))
}

/// PUT /api/v1/parsing-rules/{id} -- update a rule.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSmartParsingRule>,
) -> Result<Json<ApiResponse<SmartParsingRule>>, AppError> {
    let rule = parsing_rule::update_rule(&state.db, id, &body).await?;
    Ok(ApiResponse::success(rule))
}

/// DELETE /api/v1/parsing-rules/{id} -- delete a rule.
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    parsing_rule::delete_rule(&state.db, id).await?;
    Ok(ApiResponse::success(()))
}

/// POST /api/v1/parsing-rules/apply -- normalize one field value with the active rules.
pub async fn apply_rules(
    State(state): State<AppState>,
    Json(body): Json<ApplyRulesRequest>,
) -> Result<Json<ApiResponse<RuleApplication>>, AppError> {
    let result = parsing_rule::apply_active_rules(&state.db, body.field_type, &body.text).await?;
    Ok(ApiResponse::success(result))
}
