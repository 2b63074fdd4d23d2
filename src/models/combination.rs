//! Combination medicine model: a short code standing for several medicines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CombinationMedicine {
    pub id: Uuid,
    pub short_name: String,
    /// Medicines joined by ` + `.
    pub content: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing a combination by name.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertCombination {
    pub name: String,
    pub content: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpsertResult {
    pub action: UpsertAction,
    pub combination: CombinationMedicine,
}

/// Request body for registering a finalized medicine-name field.
#[derive(Debug, Clone, Deserialize)]
pub struct ObserveMedicineName {
    pub medicine_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserveAction {
    /// A new combination was registered.
    Created,
    /// A combination with the same name or content already exists.
    Existing,
    /// The name is not a `+`-joined compound.
    NotCompound,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObserveResult {
    pub action: ObserveAction,
    pub combination: Option<CombinationMedicine>,
}
