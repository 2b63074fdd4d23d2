//! Deterministic prescription parser combining the field extractors and the
//! medicine-name scanner.

use crate::models::prescription::{StructuredPrescription, HEURISTIC_CONFIDENCE};
use crate::parsers::extractors::FieldExtractors;
use crate::parsers::medicine_name::{NameScan, NameScanner};
use crate::parsers::vocabulary::ParserVocabulary;

/// Heuristic parser instance. Holds compiled matchers only; parsing is pure.
#[derive(Debug, Clone)]
pub struct HeuristicParser {
    vocabulary: ParserVocabulary,
    fields: FieldExtractors,
    names: NameScanner,
}

impl HeuristicParser {
    pub fn new(vocabulary: ParserVocabulary) -> Result<Self, regex::Error> {
        let fields = FieldExtractors::new(&vocabulary)?;
        let names = NameScanner::new(&vocabulary)?;
        Ok(Self {
            vocabulary,
            fields,
            names,
        })
    }

    /// Parse one prescription line. Returns `None` for blank input.
    ///
    /// The medicine name may come back empty; callers treat that as a
    /// failed parse.
    pub fn parse(&self, input: &str) -> Option<StructuredPrescription> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        // Potency and schedule feed the name scanner's stop heuristics.
        let potency = self.fields.potency(input).map(|p| p.value);
        let schedule = self.fields.schedule(input).map(|s| s.value);
        let NameScan { name, stop } = self.names.scan(input, potency.is_some(), &self.vocabulary);

        let quantity = self.fields.quantity(input).map(|q| q.value);
        let dose_form = self.fields.dose_form(input).map(|d| d.value);
        let duration = self.fields.duration(input).map(|d| d.value);

        tracing::trace!(name = %name, stop = ?stop, "Medicine name scan finished");

        let (dose_pattern, frequency_code) = match schedule {
            Some(s) => (
                s.pattern,
                s.frequency.map(|f| f.as_str().to_string()).unwrap_or_default(),
            ),
            None => (String::new(), String::new()),
        };
        let (dose_form, dose_per_intake) = match dose_form {
            Some(d) => (d.form, d.per_intake),
            None => (String::new(), String::new()),
        };

        Some(StructuredPrescription {
            medicine_name: name,
            potency: potency.unwrap_or_default(),
            quantity: quantity.unwrap_or_default(),
            dose_form,
            dose_per_intake,
            frequency_code,
            dose_pattern,
            duration_text: duration.unwrap_or_default(),
            confidence: HEURISTIC_CONFIDENCE,
        })
    }
}
