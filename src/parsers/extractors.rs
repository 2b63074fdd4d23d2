//! Single-purpose field extractors for prescription lines.
//!
//! Each field is matched by an ordered list of strategies. The first strategy
//! that returns a value wins; later strategies are never consulted. Every
//! extractor works on the raw input and never aborts the overall parse: a
//! miss simply yields `None`.

use std::ops::Range;

use regex::Regex;

use crate::models::prescription::{frequency_for_pattern, FrequencyCode};
use crate::parsers::vocabulary::{alternation, FrequencyKeyword, ParserVocabulary};

/// A value found in the input together with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub value: T,
    pub span: Range<usize>,
    /// Name of the strategy that matched, for tracing.
    pub strategy: &'static str,
}

/// Dose form plus the count taken per intake (empty when not stated).
#[derive(Debug, Clone, PartialEq)]
pub struct DoseForm {
    pub form: String,
    pub per_intake: String,
}

/// Dose pattern and the frequency derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseSchedule {
    pub pattern: String,
    pub frequency: Option<FrequencyCode>,
}

type Strategy<T> = fn(&FieldExtractors, &str) -> Option<Extracted<T>>;

/// Fraction first, so a whole-number match cannot claim the denominator.
const QUANTITY_STRATEGIES: &[Strategy<String>] = &[fraction_quantity, whole_quantity];

const DOSE_FORM_STRATEGIES: &[Strategy<DoseForm>] = &[counted_dose_form, bare_dose_form];

const SCHEDULE_STRATEGIES: &[Strategy<DoseSchedule>] = &[numeric_pattern, keyword_pattern];

/// Compiled matchers for every prescription field.
#[derive(Debug, Clone)]
pub struct FieldExtractors {
    potency: Regex,
    fraction_quantity: Regex,
    whole_quantity: Regex,
    counted_dose_form: Regex,
    bare_dose_form: Regex,
    numeric_pattern: Regex,
    frequency_keywords: Vec<(Regex, FrequencyKeyword)>,
    duration: Regex,
}

impl FieldExtractors {
    /// Compile the matchers for the given vocabulary.
    pub fn new(vocab: &ParserVocabulary) -> Result<Self, regex::Error> {
        let suffixes = alternation(&vocab.potency_suffixes);
        let units = alternation(&vocab.quantity_units);
        let forms = alternation(&vocab.dose_forms);
        let durations = alternation(&vocab.duration_units);

        let frequency_keywords = vocab
            .frequency_keywords
            .iter()
            .map(|k| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(&k.keyword)))
                    .map(|re| (re, k.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            potency: Regex::new(&format!(r"(?i)\b(\d+)\s*({suffixes})\b"))?,
            fraction_quantity: Regex::new(&format!(r"(?i)\b(\d+/\d+)\s*({units})\b"))?,
            whole_quantity: Regex::new(&format!(r"(?i)(\d+)\s*({units})\b"))?,
            counted_dose_form: Regex::new(&format!(r"(?i)\b(\d+)\s+({forms})\b"))?,
            bare_dose_form: Regex::new(&format!(r"(?i)\b({forms})\b"))?,
            numeric_pattern: Regex::new(r"\b([0-9]+)-([0-9]+)-([0-9]+)\b")?,
            frequency_keywords,
            duration: Regex::new(&format!(r"(?i)\b(\d+)\s*({durations})\b"))?,
        })
    }

    /// First `<number><suffix>` in the input, suffix upper-cased (`30c` -> `30C`).
    pub fn potency(&self, input: &str) -> Option<Extracted<String>> {
        let caps = self.potency.captures(input)?;
        let whole = caps.get(0)?;
        Some(Extracted {
            value: format!("{}{}", &caps[1], caps[2].to_uppercase()),
            span: whole.range(),
            strategy: "suffixed_number",
        })
    }

    pub fn quantity(&self, input: &str) -> Option<Extracted<String>> {
        QUANTITY_STRATEGIES
            .iter()
            .find_map(|strategy| strategy(self, input))
    }

    pub fn dose_form(&self, input: &str) -> Option<Extracted<DoseForm>> {
        DOSE_FORM_STRATEGIES
            .iter()
            .find_map(|strategy| strategy(self, input))
    }

    /// Dose pattern with its frequency; numeric patterns beat keywords.
    pub fn schedule(&self, input: &str) -> Option<Extracted<DoseSchedule>> {
        SCHEDULE_STRATEGIES
            .iter()
            .find_map(|strategy| strategy(self, input))
    }

    /// First `<n> <unit>` duration, normalized to the plural unit (`1 week` -> `1 weeks`).
    pub fn duration(&self, input: &str) -> Option<Extracted<String>> {
        let caps = self.duration.captures(input)?;
        let whole = caps.get(0)?;
        let unit = caps[2].to_lowercase();
        let unit = if unit.ends_with('s') {
            unit
        } else {
            format!("{unit}s")
        };
        Some(Extracted {
            value: format!("{} {unit}", &caps[1]),
            span: whole.range(),
            strategy: "number_unit",
        })
    }
}

// ---------------------------------------------------------------------------
// Quantity
// ---------------------------------------------------------------------------

fn fraction_quantity(x: &FieldExtractors, input: &str) -> Option<Extracted<String>> {
    let caps = x.fraction_quantity.captures(input)?;
    let whole = caps.get(0)?;
    Some(Extracted {
        value: format!("{}{}", &caps[1], caps[2].to_lowercase()),
        span: whole.range(),
        strategy: "fraction",
    })
}

fn whole_quantity(x: &FieldExtractors, input: &str) -> Option<Extracted<String>> {
    x.whole_quantity.captures_iter(input).find_map(|caps| {
        let whole = caps.get(0)?;
        // A number right after `/` is a fraction's denominator.
        if input[..whole.start()].ends_with('/') {
            return None;
        }
        Some(Extracted {
            value: format!("{}{}", &caps[1], caps[2].to_lowercase()),
            span: whole.range(),
            strategy: "whole",
        })
    })
}

// ---------------------------------------------------------------------------
// Dose form
// ---------------------------------------------------------------------------

fn counted_dose_form(x: &FieldExtractors, input: &str) -> Option<Extracted<DoseForm>> {
    let caps = x.counted_dose_form.captures(input)?;
    let whole = caps.get(0)?;
    Some(Extracted {
        value: DoseForm {
            form: caps[2].to_lowercase(),
            per_intake: caps[1].to_string(),
        },
        span: whole.range(),
        strategy: "counted",
    })
}

fn bare_dose_form(x: &FieldExtractors, input: &str) -> Option<Extracted<DoseForm>> {
    let m = x.bare_dose_form.find(input)?;
    Some(Extracted {
        value: DoseForm {
            form: m.as_str().to_lowercase(),
            per_intake: String::new(),
        },
        span: m.range(),
        strategy: "bare",
    })
}

// ---------------------------------------------------------------------------
// Dose pattern / frequency
// ---------------------------------------------------------------------------

fn numeric_pattern(x: &FieldExtractors, input: &str) -> Option<Extracted<DoseSchedule>> {
    let m = x.numeric_pattern.find(input)?;
    let pattern = m.as_str().to_string();
    Some(Extracted {
        value: DoseSchedule {
            frequency: frequency_for_pattern(&pattern),
            pattern,
        },
        span: m.range(),
        strategy: "numeric_pattern",
    })
}

fn keyword_pattern(x: &FieldExtractors, input: &str) -> Option<Extracted<DoseSchedule>> {
    x.frequency_keywords.iter().find_map(|(re, keyword)| {
        let m = re.find(input)?;
        Some(Extracted {
            value: DoseSchedule {
                pattern: keyword.pattern.clone(),
                frequency: Some(keyword.code),
            },
            span: m.range(),
            strategy: "keyword",
        })
    })
}
