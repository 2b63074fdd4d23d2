//! Word tables the prescription extractors match against.
//!
//! Kept as an injectable struct so deployments (and tests) can swap the
//! keyword table or the typical potency set without touching the extractors.

use crate::models::prescription::FrequencyCode;

/// A frequency keyword and the dose pattern it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyKeyword {
    pub keyword: String,
    pub pattern: String,
    pub code: FrequencyCode,
}

impl FrequencyKeyword {
    pub fn new(keyword: &str, pattern: &str, code: FrequencyCode) -> Self {
        Self {
            keyword: keyword.to_string(),
            pattern: pattern.to_string(),
            code,
        }
    }
}

/// Vocabulary shared by the field extractors and the medicine-name scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserVocabulary {
    /// Scanned in order; the first keyword present in the input wins.
    pub frequency_keywords: Vec<FrequencyKeyword>,
    /// Bare numbers treated as potencies when no suffixed potency was found.
    pub typical_potencies: Vec<u64>,
    /// Alternation order matters: `c` is tried before `ch`.
    pub potency_suffixes: Vec<String>,
    pub quantity_units: Vec<String>,
    pub dose_forms: Vec<String>,
    pub duration_units: Vec<String>,
}

impl Default for ParserVocabulary {
    fn default() -> Self {
        Self {
            frequency_keywords: vec![
                FrequencyKeyword::new("od", "1-0-0", FrequencyCode::Od),
                FrequencyKeyword::new("bd", "1-0-1", FrequencyCode::Bd),
                FrequencyKeyword::new("tds", "1-1-1", FrequencyCode::Tds),
                FrequencyKeyword::new("tid", "1-1-1", FrequencyCode::Tds),
                FrequencyKeyword::new("qid", "1-1-1-1", FrequencyCode::Qid),
                FrequencyKeyword::new("hs", "0-0-1", FrequencyCode::Hs),
                FrequencyKeyword::new("sos", "SOS", FrequencyCode::Sos),
                FrequencyKeyword::new("weekly", "Weekly", FrequencyCode::Weekly),
                FrequencyKeyword::new("monthly", "Monthly", FrequencyCode::Monthly),
            ],
            typical_potencies: vec![1, 3, 6, 12, 30, 60, 100, 200, 1000, 10000],
            potency_suffixes: words(&["c", "ch", "m", "x"]),
            quantity_units: words(&["dr", "oz", "ml"]),
            dose_forms: words(&[
                "pills", "drops", "tablets", "capsules", "powder", "ointment", "cream", "liquid",
            ]),
            duration_units: words(&["days", "day", "weeks", "week", "months", "month"]),
        }
    }
}

impl ParserVocabulary {
    /// Whether a lower-cased word is a unit, dose form, frequency or duration keyword.
    pub fn is_keyword(&self, lowered: &str) -> bool {
        self.quantity_units.iter().any(|w| w == lowered)
            || self.dose_forms.iter().any(|w| w == lowered)
            || self.duration_units.iter().any(|w| w == lowered)
            || self.frequency_keywords.iter().any(|k| k.keyword == lowered)
    }

    pub fn is_potency_suffix(&self, lowered: &str) -> bool {
        self.potency_suffixes.iter().any(|s| s == lowered)
    }

    pub fn is_typical_potency(&self, value: u64) -> bool {
        self.typical_potencies.contains(&value)
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// Join words into a regex alternation, escaping each one.
pub(crate) fn alternation(words: &[String]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}
