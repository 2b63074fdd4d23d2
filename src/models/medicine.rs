//! Autocomplete projection over the medicine and combination catalogues.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Medicine,
    Combination,
}

/// Autocomplete candidate for the medicine-name field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicineSuggestion {
    pub name: String,
    pub kind: SuggestionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Query parameters for the autocomplete endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}
