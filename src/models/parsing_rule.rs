//! Smart parsing rule model: operator-maintained pattern -> replacement overrides.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Prescription field a rule normalizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "rule_field_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RuleFieldType {
    Quantity,
    DoseForm,
    DosePattern,
    Duration,
}

impl std::fmt::Display for RuleFieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quantity => write!(f, "quantity"),
            Self::DoseForm => write!(f, "dose_form"),
            Self::DosePattern => write!(f, "dose_pattern"),
            Self::Duration => write!(f, "duration"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SmartParsingRule {
    pub id: Uuid,
    pub name: String,
    pub field_type: RuleFieldType,
    pub pattern: String,
    pub replacement: String,
    pub is_regex: bool,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSmartParsingRule {
    pub name: String,
    pub field_type: RuleFieldType,
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
    pub is_regex: Option<bool>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSmartParsingRule {
    pub name: Option<String>,
    pub field_type: Option<RuleFieldType>,
    pub pattern: Option<String>,
    pub replacement: Option<String>,
    pub is_regex: Option<bool>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}

/// Request body for running the active rules of one field over a value.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRulesRequest {
    pub field_type: RuleFieldType,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_uses_snake_case() {
        let ft: RuleFieldType = serde_json::from_str("\"dose_pattern\"").unwrap();
        assert_eq!(ft, RuleFieldType::DosePattern);
        assert_eq!(ft.to_string(), "dose_pattern");
    }

    #[test]
    fn create_rule_defaults_replacement() {
        let body: CreateSmartParsingRule = serde_json::from_str(
            r#"{"name":"strip","field_type":"quantity","pattern":"bottle"}"#,
        )
        .unwrap();
        assert_eq!(body.replacement, "");
        assert!(body.is_regex.is_none());
    }
}
