//! Combination medicines: derivation from medicine-name fields and storage.
//!
//! A finalized medicine name containing `+` is a compound. Two shapes are
//! recognised:
//!
//! - `ABC (Arnica + Belladonna + Calendula)`: the code names the expansion.
//! - `Arnica + Belladonna + Calendula`: the code is synthesized from the
//!   first letter of every part and the content is the whole string.

use sqlx::PgPool;

use crate::errors::{AppError, OperationContext};
use crate::models::combination::{
    CombinationMedicine, ObserveAction, ObserveResult, UpsertAction, UpsertCombination,
    UpsertResult,
};
use crate::models::pagination::{PagedResult, Pagination};

/// Short name and content derived from a compound medicine string.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedCombination {
    pub short_name: String,
    pub content: String,
}

/// Derive a combination from a medicine-name field, if it is a compound.
pub fn derive_combination(medicine_name: &str) -> Option<DerivedCombination> {
    let name = medicine_name.trim();
    if !name.contains('+') {
        return None;
    }

    if let Some(coded) = coded_combination(name) {
        return Some(coded);
    }

    let parts: Vec<&str> = name
        .split('+')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() < 2 {
        return None;
    }

    let short_name: String = parts
        .iter()
        .filter_map(|p| p.chars().find(|c| c.is_alphabetic()))
        .flat_map(char::to_uppercase)
        .collect();
    if short_name.is_empty() {
        return None;
    }

    Some(DerivedCombination {
        short_name,
        content: name.to_string(),
    })
}

/// `CODE (A + B)`: two or more upper-case ASCII letters, optional spaces, then
/// a parenthesized expansion that closes the string.
fn coded_combination(name: &str) -> Option<DerivedCombination> {
    let (code, rest) = name.strip_suffix(')')?.split_once('(')?;
    let code = code.trim_end();
    if code.len() < 2 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let content = rest.trim();
    if !content.contains('+') {
        return None;
    }
    Some(DerivedCombination {
        short_name: code.to_string(),
        content: content.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// List combinations ordered by short name.
pub async fn list(
    pool: &PgPool,
    pagination: &Pagination,
) -> Result<PagedResult<CombinationMedicine>, AppError> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM combination_medicines")
        .fetch_one(pool)
        .await
        .during("count combinations")?;

    let items = sqlx::query_as::<_, CombinationMedicine>(
        "SELECT * FROM combination_medicines ORDER BY short_name ASC LIMIT $1 OFFSET $2",
    )
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(pool)
    .await
    .during("list combinations")?;

    Ok(PagedResult::new(items, total, pagination))
}

/// Create a combination, or replace the content and description of the one
/// with the same (case-insensitive) name.
pub async fn upsert(pool: &PgPool, input: &UpsertCombination) -> Result<UpsertResult, AppError> {
    let name = input.name.trim();
    let content = input.content.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if content.is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }

    let mut tx = pool.begin().await.during("upsert combination")?;

    let existing = sqlx::query_scalar::<_, uuid::Uuid>(
        "SELECT id FROM combination_medicines WHERE lower(short_name) = lower($1) FOR UPDATE",
    )
    .bind(name)
    .fetch_optional(&mut *tx)
    .await
    .during("upsert combination")?;

    let (action, combination) = match existing {
        Some(id) => {
            let row = sqlx::query_as::<_, CombinationMedicine>(
                r#"
                UPDATE combination_medicines
                SET content = $1, description = $2, updated_at = now()
                WHERE id = $3
                RETURNING *
                "#,
            )
            .bind(content)
            .bind(&input.description)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .during("upsert combination")?;
            (UpsertAction::Updated, row)
        }
        None => {
            let row = sqlx::query_as::<_, CombinationMedicine>(
                r#"
                INSERT INTO combination_medicines (short_name, content, description)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(name)
            .bind(content)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AppError::Conflict(format!("Combination {name} was created concurrently"))
                }
                other => AppError::Persistence {
                    operation: "upsert combination",
                    source: other,
                },
            })?;
            (UpsertAction::Created, row)
        }
    };

    tx.commit().await.during("upsert combination")?;

    tracing::info!(short_name = %combination.short_name, action = ?action, "Combination saved");
    Ok(UpsertResult {
        action,
        combination,
    })
}

/// Register the combination behind a finalized medicine name, unless one
/// with the same name or content is already known. Never overwrites.
pub async fn observe_medicine_name(
    pool: &PgPool,
    medicine_name: &str,
) -> Result<ObserveResult, AppError> {
    let Some(derived) = derive_combination(medicine_name) else {
        return Ok(ObserveResult {
            action: ObserveAction::NotCompound,
            combination: None,
        });
    };

    if let Some(existing) = find_by_name_or_content(pool, &derived).await? {
        return Ok(ObserveResult {
            action: ObserveAction::Existing,
            combination: Some(existing),
        });
    }

    let inserted = sqlx::query_as::<_, CombinationMedicine>(
        r#"
        INSERT INTO combination_medicines (short_name, content)
        VALUES ($1, $2)
        ON CONFLICT ((lower(short_name))) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(&derived.short_name)
    .bind(&derived.content)
    .fetch_optional(pool)
    .await
    .during("register combination")?;

    match inserted {
        Some(combination) => {
            tracing::info!(
                short_name = %combination.short_name,
                "Registered combination from medicine name"
            );
            Ok(ObserveResult {
                action: ObserveAction::Created,
                combination: Some(combination),
            })
        }
        // Lost a race with a concurrent insert of the same name.
        None => Ok(ObserveResult {
            action: ObserveAction::Existing,
            combination: find_by_name_or_content(pool, &derived).await?,
        }),
    }
}

async fn find_by_name_or_content(
    pool: &PgPool,
    derived: &DerivedCombination,
) -> Result<Option<CombinationMedicine>, AppError> {
    sqlx::query_as::<_, CombinationMedicine>(
        r#"
        SELECT * FROM combination_medicines
        WHERE lower(short_name) = lower($1) OR lower(content) = lower($2)
        ORDER BY (lower(short_name) = lower($1)) DESC
        LIMIT 1
        "#,
    )
    .bind(&derived.short_name)
    .bind(&derived.content)
    .fetch_optional(pool)
    .await
    .during("look up combination")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_compound_synthesizes_short_name() {
        let d = derive_combination("Arnica + Belladonna + Calendula").unwrap();
        assert_eq!(d.short_name, "ABC");
        assert_eq!(d.content, "Arnica + Belladonna + Calendula");
    }

    #[test]
    fn two_part_compound() {
        let d = derive_combination("Arnica + Belladonna").unwrap();
        assert_eq!(d.short_name, "AB");
    }

    #[test]
    fn lower_case_parts_are_upper_cased() {
        let d = derive_combination("nux vomica+ bryonia").unwrap();
        assert_eq!(d.short_name, "NB");
        assert_eq!(d.content, "nux vomica+ bryonia");
    }

    #[test]
    fn coded_compound_uses_code_and_expansion() {
        let d = derive_combination("RBC (Rhus Tox + Bryonia + Calc Fluor)").unwrap();
        assert_eq!(d.short_name, "RBC");
        assert_eq!(d.content, "Rhus Tox + Bryonia + Calc Fluor");
    }

    #[test]
    fn single_letter_code_is_not_a_code() {
        let d = derive_combination("R (Rhus Tox + Bryonia)").unwrap();
        assert_eq!(d.short_name, "RB");
        assert_eq!(d.content, "R (Rhus Tox + Bryonia)");
    }

    #[test]
    fn code_may_sit_flush_against_the_parenthesis() {
        let d = derive_combination("ABC(Arnica + Belladonna + Calendula)").unwrap();
        assert_eq!(d.short_name, "ABC");
        assert_eq!(d.content, "Arnica + Belladonna + Calendula");
    }

    #[test]
    fn lower_case_code_falls_back_to_bare_compound() {
        let d = derive_combination("abc (Arnica + Belladonna)").unwrap();
        assert_eq!(d.short_name, "AB");
        assert_eq!(d.content, "abc (Arnica + Belladonna)");
    }

    #[test]
    fn plain_name_is_not_a_compound() {
        assert!(derive_combination("Arnica Montana").is_none());
    }

    #[test]
    fn dangling_plus_is_not_a_compound() {
        assert!(derive_combination("Arnica +").is_none());
        assert!(derive_combination(" + ").is_none());
    }
}
