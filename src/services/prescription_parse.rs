//! Parse orchestration: AI attempt first when enabled, heuristic fallback.
//!
//! The chain is strictly two steps with no retries. The AI attempt only runs
//! when the request enables it and a credential is available; any AI failure
//! moves on to the heuristic parser. A heuristic result without a medicine
//! name is a failed parse.

use crate::models::prescription::{ParseMethod, ParseOutcome, ParseRequest};
use crate::parsers::HeuristicParser;
use crate::services::ai_parser::AiPrescriptionParser;

/// Parse a free-text prescription line.
pub async fn parse_prescription(
    heuristic: &HeuristicParser,
    ai: &AiPrescriptionParser,
    request: &ParseRequest,
) -> ParseOutcome {
    let raw = request.raw_text.trim();
    if raw.is_empty() {
        return ParseOutcome::failed();
    }

    if request.use_ai {
        match ai.credential(request.credential.as_deref()) {
            Some(credential) => match ai.parse(raw, credential).await {
                Ok(data) => {
                    tracing::debug!(medicine = %data.medicine_name, "AI parse succeeded");
                    return ParseOutcome::parsed(data, ParseMethod::Ai);
                }
                Err(e) => {
                    tracing::debug!(
                        error = %e,
                        "AI parse failed, falling back to heuristic parser"
                    );
                }
            },
            None => {
                tracing::debug!("AI parse requested without a credential, using heuristic parser");
            }
        }
    }

    heuristic_outcome(heuristic, raw)
}

/// Run only the heuristic parser.
pub fn heuristic_outcome(heuristic: &HeuristicParser, raw: &str) -> ParseOutcome {
    match heuristic.parse(raw) {
        Some(data) if !data.medicine_name.is_empty() => {
            ParseOutcome::parsed(data, ParseMethod::Regex)
        }
        Some(_) => {
            tracing::debug!("Heuristic parse found no medicine name");
            ParseOutcome::failed()
        }
        None => ParseOutcome::failed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::parsers::ParserVocabulary;

    fn heuristic() -> HeuristicParser {
        HeuristicParser::new(ParserVocabulary::default()).unwrap()
    }

    fn offline_ai() -> AiPrescriptionParser {
        AiPrescriptionParser::new(reqwest::Client::new(), AiConfig::default())
    }

    fn request(raw: &str, use_ai: bool) -> ParseRequest {
        ParseRequest {
            raw_text: raw.to_string(),
            use_ai,
            credential: None,
        }
    }

    #[tokio::test]
    async fn disabled_ai_uses_heuristic() {
        let outcome = parse_prescription(
            &heuristic(),
            &offline_ai(),
            &request("Arnica 30C 2dr", false),
        )
        .await;
        assert!(outcome.success);
        assert_eq!(outcome.method, Some(ParseMethod::Regex));
        assert_eq!(outcome.data.unwrap().medicine_name, "Arnica");
    }

    #[tokio::test]
    async fn enabled_ai_without_credential_skips_ai() {
        let outcome =
            parse_prescription(&heuristic(), &offline_ai(), &request("Arnica 30C", true)).await;
        assert_eq!(outcome.method, Some(ParseMethod::Regex));
    }

    #[tokio::test]
    async fn empty_input_fails() {
        let outcome = parse_prescription(&heuristic(), &offline_ai(), &request("   ", true)).await;
        assert_eq!(outcome, ParseOutcome::failed());
    }

    #[test]
    fn missing_medicine_name_fails() {
        let outcome = heuristic_outcome(&heuristic(), "200C 4 pills");
        assert!(!outcome.success);
        assert!(outcome.data.is_none());
    }
}
