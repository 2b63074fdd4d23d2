//! Medicine-name scanner.
//!
//! Consumes words from the start of the line until one of them looks like the
//! beginning of another field (potency, quantity, keyword, dose pattern).

use regex::Regex;

use crate::parsers::vocabulary::{alternation, ParserVocabulary};

/// Why the scanner stopped consuming words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    PotencyToken,
    Fraction,
    BareNumber,
    Keyword,
    DosePattern,
}

/// Result of scanning a line for its medicine name.
#[derive(Debug, Clone, PartialEq)]
pub struct NameScan {
    /// Re-cased name; empty when the first word already stopped the scan.
    pub name: String,
    pub stop: Option<StopReason>,
}

/// Word-shape matchers used as stop conditions.
#[derive(Debug, Clone)]
pub struct NameScanner {
    potency_token: Regex,
    fraction: Regex,
    bare_number: Regex,
    dose_pattern: Regex,
}

impl NameScanner {
    pub fn new(vocab: &ParserVocabulary) -> Result<Self, regex::Error> {
        let suffixes = alternation(&vocab.potency_suffixes);
        Ok(Self {
            potency_token: Regex::new(&format!(r"(?i)^\d+(?:{suffixes})$"))?,
            fraction: Regex::new(r"^\d+/\d+")?,
            bare_number: Regex::new(r"^\d+$")?,
            dose_pattern: Regex::new(r"^[0-9]+-[0-9]+-[0-9]+$")?,
        })
    }

    /// Scan `input` word by word.
    ///
    /// `potency_found` tells the bare-number heuristic whether a suffixed
    /// potency was already captured elsewhere in the line.
    pub fn scan(&self, input: &str, potency_found: bool, vocab: &ParserVocabulary) -> NameScan {
        let words: Vec<&str> = input.split_whitespace().collect();
        let mut taken: Vec<&str> = Vec::new();
        let mut stop = None;

        for (i, word) in words.iter().copied().enumerate() {
            let next = words.get(i + 1).copied();
            if let Some(reason) = self.stop_reason(word, next, potency_found, vocab) {
                stop = Some(reason);
                break;
            }
            taken.push(word);
        }

        NameScan {
            name: recase(&taken.join(" ")),
            stop,
        }
    }

    /// Checked in a fixed order; the first matching condition wins.
    fn stop_reason(
        &self,
        word: &str,
        next: Option<&str>,
        potency_found: bool,
        vocab: &ParserVocabulary,
    ) -> Option<StopReason> {
        if self.potency_token.is_match(word) {
            return Some(StopReason::PotencyToken);
        }
        if self.fraction.is_match(word) {
            return Some(StopReason::Fraction);
        }
        if self.bare_number.is_match(word) && looks_like_potency(word, next, potency_found, vocab)
        {
            return Some(StopReason::BareNumber);
        }
        if vocab.is_keyword(&word.to_lowercase()) {
            return Some(StopReason::Keyword);
        }
        if self.dose_pattern.is_match(word) {
            return Some(StopReason::DosePattern);
        }
        None
    }
}

/// A bare number is a potency when a suffix follows it, or when it is a
/// typical potency value and no suffixed potency exists.
fn looks_like_potency(
    word: &str,
    next: Option<&str>,
    potency_found: bool,
    vocab: &ParserVocabulary,
) -> bool {
    if next.is_some_and(|n| vocab.is_potency_suffix(&n.to_lowercase())) {
        return true;
    }
    match word.parse::<u64>() {
        Ok(value) => vocab.is_typical_potency(value) && !potency_found,
        Err(_) => false,
    }
}

/// Capitalize each space-separated token (`ars alb` -> `Ars Alb`).
pub fn recase(name: &str) -> String {
    name.split(' ')
        .map(|token| {
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str, potency_found: bool) -> NameScan {
        let vocab = ParserVocabulary::default();
        NameScanner::new(&vocab)
            .unwrap()
            .scan(input, potency_found, &vocab)
    }

    #[test]
    fn stops_at_fused_potency() {
        let s = scan("ars alb 1M 1/2oz", true);
        assert_eq!(s.name, "Ars Alb");
        assert_eq!(s.stop, Some(StopReason::PotencyToken));
    }

    #[test]
    fn stops_at_fraction() {
        let s = scan("Bryonia 1/2oz", false);
        assert_eq!(s.name, "Bryonia");
        assert_eq!(s.stop, Some(StopReason::Fraction));
    }

    #[test]
    fn fused_quantity_joins_the_name() {
        let s = scan("Bryonia 2dr pills", false);
        assert_eq!(s.name, "Bryonia 2dr");
        assert_eq!(s.stop, Some(StopReason::Keyword));
    }

    #[test]
    fn typical_bare_number_stops_when_no_potency_found() {
        let s = scan("Arnica 200 2dr pills", false);
        assert_eq!(s.name, "Arnica");
        assert_eq!(s.stop, Some(StopReason::BareNumber));
    }

    #[test]
    fn typical_bare_number_is_kept_when_potency_found() {
        let s = scan("Kali 30 pills", true);
        assert_eq!(s.name, "Kali 30");
        assert_eq!(s.stop, Some(StopReason::Keyword));
    }

    #[test]
    fn bare_number_followed_by_suffix_stops() {
        let s = scan("Sulphur 45 c", true);
        assert_eq!(s.name, "Sulphur");
        assert_eq!(s.stop, Some(StopReason::BareNumber));
    }

    #[test]
    fn untypical_bare_number_joins_the_name() {
        let s = scan("Formula 45 drops", false);
        assert_eq!(s.name, "Formula 45");
    }

    #[test]
    fn stops_at_keyword_case_insensitively() {
        let s = scan("Nux Vomica TDS", false);
        assert_eq!(s.name, "Nux Vomica");
        assert_eq!(s.stop, Some(StopReason::Keyword));
    }

    #[test]
    fn stops_at_dose_pattern() {
        let s = scan("Rhus tox 4-4-4", false);
        assert_eq!(s.name, "Rhus Tox");
        assert_eq!(s.stop, Some(StopReason::DosePattern));
    }

    #[test]
    fn empty_when_first_word_stops() {
        let s = scan("30C 4 pills", true);
        assert_eq!(s.name, "");
        assert_eq!(s.stop, Some(StopReason::PotencyToken));
    }

    #[test]
    fn whole_line_is_name_when_nothing_stops() {
        let s = scan("arnica montana", false);
        assert_eq!(s.name, "Arnica Montana");
        assert_eq!(s.stop, None);
    }

    #[test]
    fn recase_lowers_the_tail() {
        assert_eq!(recase("NUX vOMICA"), "Nux Vomica");
        assert_eq!(recase("Arnica + belladonna"), "Arnica + Belladonna");
        assert_eq!(recase(""), "");
    }
}
