//! Autocomplete over the medicine catalogue and known combinations.

use sqlx::{FromRow, PgPool};

use crate::errors::{AppError, OperationContext};
use crate::models::medicine::{MedicineSuggestion, SuggestionKind};

/// Maximum candidates returned per kind.
const MAX_PER_KIND: i64 = 10;

#[derive(Debug, FromRow)]
struct CombinationRow {
    short_name: String,
    content: String,
    description: Option<String>,
}

/// Up to ten medicines followed by up to ten combinations whose name (or,
/// for combinations, content) contains `prefix`, case-insensitively.
pub async fn search(pool: &PgPool, prefix: &str) -> Result<Vec<MedicineSuggestion>, AppError> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }
    let pattern = like_pattern(prefix);

    let medicines = sqlx::query_scalar::<_, String>(
        r#"
        SELECT name FROM medicines
        WHERE name ILIKE $1 ESCAPE '\'
        ORDER BY name ASC
        LIMIT $2
        "#,
    )
    .bind(&pattern)
    .bind(MAX_PER_KIND)
    .fetch_all(pool)
    .await
    .during("search medicines")?;

    let combinations = sqlx::query_as::<_, CombinationRow>(
        r#"
        SELECT short_name, content, description FROM combination_medicines
        WHERE short_name ILIKE $1 ESCAPE '\' OR content ILIKE $1 ESCAPE '\'
        ORDER BY short_name ASC
        LIMIT $2
        "#,
    )
    .bind(&pattern)
    .bind(MAX_PER_KIND)
    .fetch_all(pool)
    .await
    .during("search combinations")?;

    let suggestions = medicines
        .into_iter()
        .map(|name| MedicineSuggestion {
            name,
            kind: SuggestionKind::Medicine,
            content: None,
            description: None,
        })
        .chain(combinations.into_iter().map(|row| MedicineSuggestion {
            name: row.short_name,
            kind: SuggestionKind::Combination,
            content: Some(row.content),
            description: row.description,
        }))
        .collect();

    Ok(suggestions)
}

/// Build a substring `ILIKE` pattern, escaping the wildcard characters.
fn like_pattern(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 2);
    escaped.push('%');
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_in_wildcards() {
        assert_eq!(like_pattern("arn"), "%arn%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_a\\"), r"%50\%\_a\\%");
    }
}
