//! AI-assisted prescription parsing through an OpenAI-compatible
//! chat-completions endpoint.
//!
//! Every failure (transport, status, missing content, undecodable JSON) comes
//! back as an [`AiParseError`]; the orchestrator turns that into a fallback.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::AiConfig;
use crate::models::prescription::{
    frequency_for_pattern, is_numeric_pattern, FrequencyCode, StructuredPrescription,
    HEURISTIC_CONFIDENCE,
};

/// Fixed instruction sent with every request.
pub const INSTRUCTIONS: &str = r#"You parse homeopathic prescription lines into JSON.
Return exactly one JSON object with these string fields:
"medicine_name", "potency", "quantity", "dose_form", "dose_per_intake",
"frequency_code", "dose_pattern", "duration_text", and a number "confidence" between 0 and 1.
Rules:
- Medicine names may be abbreviated (e.g. "Ars alb", "Nux vom"); expand them to the full Latin name.
- Potency formats include 1M, 10M, 30C, 200C, 30CH, 6X.
- Quantities may be fractional, e.g. 1/2oz, 2dr, 30ml.
- dose_pattern is a 3-part morning-afternoon-evening count such as 4-4-4 or 1-0-1.
- Derive frequency_code from dose_pattern by counting non-zero parts: 1=OD, 2=BD, 3=TDS, 4=QID.
- duration_text is "<number> <days|weeks|months>".
- Every field the line does not mention must be an empty string, never omitted and never null.
Respond with the JSON object only."#;

/// Reasons an AI parse produced no result.
#[derive(Debug, thiserror::Error)]
pub enum AiParseError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion service returned status {0}")]
    Status(u16),

    #[error("Completion response had no message content")]
    MissingContent,

    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No JSON object found in completion content")]
    NoJsonObject,

    #[error("Completion did not name a medicine")]
    EmptyResult,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for the completion service.
#[derive(Debug, Clone)]
pub struct AiPrescriptionParser {
    http: reqwest::Client,
    config: AiConfig,
}

impl AiPrescriptionParser {
    pub fn new(http: reqwest::Client, config: AiConfig) -> Self {
        Self { http, config }
    }

    /// The credential to use: the caller's when non-blank, else the configured default.
    pub fn credential<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .or(self.config.default_api_key.as_deref())
    }

    /// Send `raw_input` to the completion service and decode its answer.
    pub async fn parse(
        &self,
        raw_input: &str,
        credential: &str,
    ) -> Result<StructuredPrescription, AiParseError> {
        let body = json!({
            "model": self.config.model,
            "temperature": 0.1,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": INSTRUCTIONS },
                { "role": "user", "content": raw_input },
            ],
        });

        let resp = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(credential)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AiParseError::Status(status.as_u16()));
        }

        let text = resp.text().await?;
        let completion: ChatCompletion = serde_json::from_str(&text)?;
        let content = completion
            .choices
            .into_iter()
            .find_map(|c| c.message.and_then(|m| m.content))
            .filter(|c| !c.trim().is_empty())
            .ok_or(AiParseError::MissingContent)?;

        decode_prescription(&content)
    }
}

/// Decode the model's message content into a prescription.
///
/// Tolerates code fences or prose around the object, camelCase keys and
/// numbers where strings are expected. Omitted fields become empty strings;
/// an omitted confidence becomes 0.5.
pub fn decode_prescription(content: &str) -> Result<StructuredPrescription, AiParseError> {
    let start = content.find('{').ok_or(AiParseError::NoJsonObject)?;
    let end = content.rfind('}').ok_or(AiParseError::NoJsonObject)?;
    if end < start {
        return Err(AiParseError::NoJsonObject);
    }
    let object: Map<String, Value> = serde_json::from_str(&content[start..=end])?;

    let medicine_name = text_field(&object, "medicine_name", "medicineName");
    if medicine_name.is_empty() {
        return Err(AiParseError::EmptyResult);
    }

    let dose_pattern = text_field(&object, "dose_pattern", "dosePattern");
    let frequency_code = normalize_frequency(
        &text_field(&object, "frequency_code", "frequencyCode"),
        &dose_pattern,
    );
    let confidence = object
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0) as f32)
        .unwrap_or(HEURISTIC_CONFIDENCE);

    Ok(StructuredPrescription {
        medicine_name,
        potency: text_field(&object, "potency", "potency"),
        quantity: text_field(&object, "quantity", "quantity"),
        dose_form: text_field(&object, "dose_form", "doseForm"),
        dose_per_intake: text_field(&object, "dose_per_intake", "dosePerIntake"),
        frequency_code,
        dose_pattern,
        duration_text: text_field(&object, "duration_text", "durationText"),
        confidence,
    })
}

fn text_field(object: &Map<String, Value>, key: &str, alias: &str) -> String {
    match object.get(key).or_else(|| object.get(alias)) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Keep a recognised code; otherwise derive it from the pattern.
/// A numeric pattern always decides the code; the model's code only stands
/// for keyword or empty patterns.
fn normalize_frequency(code: &str, pattern: &str) -> String {
    let frequency = if is_numeric_pattern(pattern) {
        frequency_for_pattern(pattern)
    } else {
        FrequencyCode::from_code(code).or_else(|| FrequencyCode::from_code(pattern))
    };
    frequency.map(|f| f.as_str().to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_complete_object() {
        let content = r#"{"medicine_name":"Arsenicum Album","potency":"1M","quantity":"1/2oz",
            "dose_form":"liquid","dose_per_intake":"","frequency_code":"TDS",
            "dose_pattern":"6-6-6","duration_text":"4 weeks","confidence":0.9}"#;
        let rx = decode_prescription(content).unwrap();
        assert_eq!(rx.medicine_name, "Arsenicum Album");
        assert_eq!(rx.frequency_code, "TDS");
        assert_eq!(rx.confidence, 0.9);
    }

    #[test]
    fn omitted_fields_default_to_empty_and_confidence_to_half() {
        let rx = decode_prescription(r#"{"medicine_name":"Arnica Montana"}"#).unwrap();
        assert_eq!(rx.potency, "");
        assert_eq!(rx.duration_text, "");
        assert_eq!(rx.confidence, 0.5);
    }

    #[test]
    fn accepts_fenced_camel_case_and_numbers() {
        let content = "```json\n{\"medicineName\":\"Nux Vomica\",\"dosePerIntake\":4,\"dosePattern\":\"1-0-1\"}\n```";
        let rx = decode_prescription(content).unwrap();
        assert_eq!(rx.medicine_name, "Nux Vomica");
        assert_eq!(rx.dose_per_intake, "4");
        assert_eq!(rx.frequency_code, "BD");
    }

    #[test]
    fn unknown_frequency_is_rederived_from_pattern() {
        let rx = decode_prescription(
            r#"{"medicine_name":"Bryonia","frequency_code":"thrice","dose_pattern":"2-2-2"}"#,
        )
        .unwrap();
        assert_eq!(rx.frequency_code, "TDS");
    }

    #[test]
    fn numeric_pattern_overrides_contradicting_code() {
        let rx = decode_prescription(
            r#"{"medicine_name":"Arnica","dose_pattern":"1-0-1","frequency_code":"TDS"}"#,
        )
        .unwrap();
        assert_eq!(rx.dose_pattern, "1-0-1");
        assert_eq!(rx.frequency_code, "BD");
    }

    #[test]
    fn code_stands_when_pattern_is_empty() {
        let rx =
            decode_prescription(r#"{"medicine_name":"Arnica","frequency_code":"hs"}"#).unwrap();
        assert_eq!(rx.frequency_code, "HS");
    }

    #[test]
    fn keyword_pattern_supplies_frequency() {
        let rx = decode_prescription(r#"{"medicine_name":"Arnica","dose_pattern":"SOS"}"#).unwrap();
        assert_eq!(rx.frequency_code, "SOS");
    }

    #[test]
    fn confidence_is_clamped() {
        let rx = decode_prescription(r#"{"medicine_name":"Arnica","confidence":7}"#).unwrap();
        assert_eq!(rx.confidence, 1.0);
    }

    #[test]
    fn missing_object_is_an_error() {
        assert!(matches!(
            decode_prescription("I cannot help with that"),
            Err(AiParseError::NoJsonObject)
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            decode_prescription(r#"{"medicine_name": }"#),
            Err(AiParseError::Decode(_))
        ));
    }

    #[test]
    fn empty_medicine_name_is_an_error() {
        assert!(matches!(
            decode_prescription(r#"{"medicine_name":"","potency":"30C"}"#),
            Err(AiParseError::EmptyResult)
        ));
    }

    #[test]
    fn request_credential_beats_default() {
        let config = AiConfig {
            default_api_key: Some("default-key".to_string()),
            ..AiConfig::default()
        };
        let ai = AiPrescriptionParser::new(reqwest::Client::new(), config);
        assert_eq!(ai.credential(Some("mine")), Some("mine"));
        assert_eq!(ai.credential(Some("  ")), Some("default-key"));
        assert_eq!(ai.credential(None), Some("default-key"));
    }

    #[test]
    fn no_credential_without_default() {
        let ai = AiPrescriptionParser::new(reqwest::Client::new(), AiConfig::default());
        assert_eq!(ai.credential(None), None);
    }
}
