//! Structured prescription model produced by the text parsers.

use serde::{Deserialize, Serialize};

/// Confidence assigned to every heuristic parse.
pub const HEURISTIC_CONFIDENCE: f32 = 0.5;

/// A single prescription line broken into its fields.
///
/// Fields the parsers could not find are empty strings, never absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredPrescription {
    pub medicine_name: String,
    pub potency: String,
    pub quantity: String,
    pub dose_form: String,
    pub dose_per_intake: String,
    pub frequency_code: String,
    pub dose_pattern: String,
    pub duration_text: String,
    pub confidence: f32,
}

/// Frequency abbreviations a dose pattern can be summarized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyCode {
    #[serde(rename = "OD")]
    Od,
    #[serde(rename = "BD")]
    Bd,
    #[serde(rename = "TDS")]
    Tds,
    #[serde(rename = "QID")]
    Qid,
    #[serde(rename = "HS")]
    Hs,
    #[serde(rename = "SOS")]
    Sos,
    Weekly,
    Monthly,
}

impl FrequencyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Od => "OD",
            Self::Bd => "BD",
            Self::Tds => "TDS",
            Self::Qid => "QID",
            Self::Hs => "HS",
            Self::Sos => "SOS",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    /// Parse a frequency code case-insensitively. `TID` is an alias of `TDS`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "OD" => Some(Self::Od),
            "BD" => Some(Self::Bd),
            "TDS" | "TID" => Some(Self::Tds),
            "QID" => Some(Self::Qid),
            "HS" => Some(Self::Hs),
            "SOS" => Some(Self::Sos),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Map a count of non-zero pattern segments to its code.
    pub fn from_intake_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::Od),
            2 => Some(Self::Bd),
            3 => Some(Self::Tds),
            4 => Some(Self::Qid),
            _ => None,
        }
    }
}

impl std::fmt::Display for FrequencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the frequency code of a dash-joined dose pattern such as `6-6-6`.
///
/// Returns `None` when a segment is not an ASCII digit run or when the
/// number of non-zero segments has no code (zero, or more than four).
/// Segments are compared textually, so arbitrarily long counts still map.
pub fn frequency_for_pattern(pattern: &str) -> Option<FrequencyCode> {
    if !is_numeric_pattern(pattern) {
        return None;
    }
    let non_zero = pattern
        .split('-')
        .filter(|segment| !segment.trim().trim_start_matches('0').is_empty())
        .count();
    FrequencyCode::from_intake_count(non_zero)
}

/// True for dash-joined ASCII digit runs such as `1-0-1` or `0-0-0-1`.
pub fn is_numeric_pattern(pattern: &str) -> bool {
    pattern.contains('-')
        && pattern.split('-').all(|segment| {
            let segment = segment.trim();
            !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
        })
}

/// Strategy that produced a parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMethod {
    Ai,
    Regex,
}

/// Request body for parsing a free-text prescription line.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseRequest {
    pub raw_text: String,
    #[serde(default)]
    pub use_ai: bool,
    pub credential: Option<String>,
}

/// Terminal output of the parse orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StructuredPrescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ParseMethod>,
}

impl ParseOutcome {
    pub fn parsed(data: StructuredPrescription, method: ParseMethod) -> Self {
        Self {
            success: true,
            data: Some(data),
            method: Some(method),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            data: None,
            method: None,
        }
    }
}
