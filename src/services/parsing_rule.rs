//! Database-backed smart parsing rule store.
//!
//! CRUD for the rule table plus loading the active rules of a field. The
//! evaluation logic lives in [`crate::services::rule_engine`].

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::{AppError, OperationContext};
use crate::models::parsing_rule::{
    CreateSmartParsingRule, RuleFieldType, SmartParsingRule, UpdateSmartParsingRule,
};
use crate::services::rule_engine::{self, RuleApplication};

/// List all rules ordered by priority descending, oldest first on ties.
pub async fn list_rules(pool: &PgPool) -> Result<Vec<SmartParsingRule>, AppError> {
    sqlx::query_as::<_, SmartParsingRule>(
        "SELECT * FROM smart_parsing_rules ORDER BY priority DESC, created_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await
    .during("list parsing rules")
}

/// Active rules for one field in evaluation order.
pub async fn list_active_rules(
    pool: &PgPool,
    field_type: RuleFieldType,
) -> Result<Vec<SmartParsingRule>, AppError> {
    sqlx::query_as::<_, SmartParsingRule>(
        r#"
        SELECT * FROM smart_parsing_rules
        WHERE field_type = $1 AND is_active
        ORDER BY priority DESC, created_at ASC, id ASC
        "#,
    )
    .bind(field_type)
    .fetch_all(pool)
    .await
    .during("list active parsing rules")
}

/// Create a new rule. Regex rules must compile.
pub async fn create_rule(
    pool: &PgPool,
    input: &CreateSmartParsingRule,
) -> Result<SmartParsingRule, AppError> {
    let is_regex = input.is_regex.unwrap_or(false);
    validate(&input.name, &input.pattern, is_regex)?;

    let rule = sqlx::query_as::<_, SmartParsingRule>(
        r#"
        INSERT INTO smart_parsing_rules (name, field_type, pattern, replacement, is_regex, priority, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(input.name.trim())
    .bind(input.field_type)
    .bind(&input.pattern)
    .bind(&input.replacement)
    .bind(is_regex)
    .bind(input.priority.unwrap_or(0))
    .bind(input.is_active.unwrap_or(true))
    .fetch_one(pool)
    .await
    .during("create parsing rule")?;

    tracing::info!(rule_id = %rule.id, field_type = %rule.field_type, "Parsing rule created");
    Ok(rule)
}

/// Update an existing rule; absent fields keep their stored value.
pub async fn update_rule(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateSmartParsingRule,
) -> Result<SmartParsingRule, AppError> {
    let existing = sqlx::query_as::<_, SmartParsingRule>(
        "SELECT * FROM smart_parsing_rules WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .during("load parsing rule")?
    .ok_or_else(|| AppError::NotFound(format!("Parsing rule {id} not found")))?;

    let name = input.name.as_deref().unwrap_or(&existing.name);
    let field_type = input.field_type.unwrap_or(existing.field_type);
    let pattern = input.pattern.as_deref().unwrap_or(&existing.pattern);
    let replacement = input.replacement.as_deref().unwrap_or(&existing.replacement);
    let is_regex = input.is_regex.unwrap_or(existing.is_regex);
    let priority = input.priority.unwrap_or(existing.priority);
    let is_active = input.is_active.unwrap_or(existing.is_active);

    validate(name, pattern, is_regex)?;

    let rule = sqlx::query_as::<_, SmartParsingRule>(
        r#"
        UPDATE smart_parsing_rules
        SET name = $1, field_type = $2, pattern = $3, replacement = $4,
            is_regex = $5, priority = $6, is_active = $7, updated_at = now()
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(name.trim())
    .bind(field_type)
    .bind(pattern)
    .bind(replacement)
    .bind(is_regex)
    .bind(priority)
    .bind(is_active)
    .bind(id)
    .fetch_optional(pool)
    .await
    .during("update parsing rule")?
    .ok_or_else(|| AppError::NotFound(format!("Parsing rule {id} not found")))?;

    Ok(rule)
}

/// Delete a rule by ID.
pub async fn delete_rule(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM smart_parsing_rules WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .during("delete parsing rule")?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Parsing rule {id} not found")));
    }

    Ok(())
}

/// Load the active rules of a field and run them over `text`.
pub async fn apply_active_rules(
    pool: &PgPool,
    field_type: RuleFieldType,
    text: &str,
) -> Result<RuleApplication, AppError> {
    let rules = list_active_rules(pool, field_type).await?;
    Ok(rule_engine::apply_rules(&rules, field_type, text))
}

fn validate(name: &str, pattern: &str, is_regex: bool) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if pattern.is_empty() {
        return Err(AppError::Validation("pattern is required".to_string()));
    }
    rule_engine::validate_pattern(pattern, is_regex)
        .map_err(|e| AppError::Validation(format!("invalid regex pattern: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_blank_name_and_pattern() {
        assert!(matches!(validate(" ", "x", false), Err(AppError::Validation(_))));
        assert!(matches!(validate("r", "", false), Err(AppError::Validation(_))));
    }

    #[test]
    fn validate_rejects_uncompilable_regex() {
        let err = validate("r", "(unclosed", true).unwrap_err();
        assert!(err.to_string().contains("invalid regex pattern"));
    }

    #[test]
    fn validate_accepts_literal_with_metacharacters() {
        assert!(validate("r", "(unclosed", false).is_ok());
    }
}
