//! Response parsing: from arbitrary pasted text to a typed entity.
//!
//! ## Why is the parser this tolerant?
//!
//! The "AI call" is a human copy/pasting through an external chat session,
//! so the input is whatever the clipboard caught: the JSON alone if the model
//! obeyed, or the JSON wrapped in ``` fences, prefixed with "Here is your
//! plan:", suffixed with usage advice. The extraction pipeline peels those
//! layers deterministically:
//!
//! 1. trim
//! 2. prefer the contents of a fenced code block (```json or bare ```)
//! 3. slice from the first `{` to the last `}` inclusive
//! 4. parse the slice as JSON
//! 5. classify by structural signature: Project ≻ Rubric ≻ Instrument
//!
//! Classification checks use JavaScript truthiness (absent, `null`, `""`,
//! `0` and `false` all fail a signature) so behaviour matches what the tool
//! historically accepted. Nothing is partially applied: the caller sees
//! either a fully decoded entity or a [`ParseError`].
//!
//! Failure logging is deliberately left to callers — the errors are
//! user-correctable input problems, not library events.

use crate::error::ParseError;
use crate::model::{Instrument, Project, Rubric};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

static RE_FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").unwrap());

/// A successfully parsed and classified AI response.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEntity {
    Project(Box<Project>),
    Rubric(Rubric),
    Instrument(Instrument),
}

impl ParsedEntity {
    /// Short lowercase tag for logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            ParsedEntity::Project(_) => "proyecto",
            ParsedEntity::Rubric(_) => "rubrica",
            ParsedEntity::Instrument(_) => "instrumento",
        }
    }
}

/// Parse pasted text into one of the three entity shapes.
///
/// See the module docs for the extraction pipeline. The returned entity is
/// fully decoded; field-level tolerance (defaults for everything the
/// response omitted) lives in the model types themselves.
///
/// # Errors
/// * [`ParseError::NoJsonFound`] — no `{` / `}` pair anywhere in the text
/// * [`ParseError::InvalidJson`] — the brace-delimited slice failed JSON
///   parsing (or carried type-level garbage for a recognised signature);
///   wraps the underlying message
/// * [`ParseError::UnrecognizedShape`] — valid JSON, unknown signature
pub fn parse(raw: &str) -> Result<ParsedEntity, ParseError> {
    let mut text = raw.trim();

    if let Some(caps) = RE_FENCED_BLOCK.captures(text) {
        text = caps.get(1).expect("capture group 1").as_str();
    }

    let first = text.find('{');
    let last = text.rfind('}');
    let slice = match (first, last) {
        (Some(start), Some(end)) if start <= end => &text[start..=end],
        _ => return Err(ParseError::NoJsonFound),
    };

    let value: Value =
        serde_json::from_str(slice).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    classify(value)
}

/// Classify a decoded JSON value by structural signature, in priority order.
///
/// The Project check precedes the Rubric check on purpose: a project that
/// happens to embed a `criterios` array must still classify as a project.
fn classify(value: Value) -> Result<ParsedEntity, ParseError> {
    let is_project = truthy(value.get("nombre_proyecto")) && truthy(value.get("cronograma"));
    let is_rubric = value.get("criterios").map(Value::is_array).unwrap_or(false);
    let is_instrument = truthy(value.get("instrumento")) && truthy(value.get("items"));

    let entity = if is_project {
        ParsedEntity::Project(Box::new(decode(value)?))
    } else if is_rubric {
        ParsedEntity::Rubric(decode(value)?)
    } else if is_instrument {
        ParsedEntity::Instrument(decode(value)?)
    } else {
        return Err(ParseError::UnrecognizedShape);
    };

    debug!(kind = entity.kind(), "classified pasted response");
    Ok(entity)
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

/// JavaScript truthiness over a JSON value, with `None` for an absent key.
fn truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Clean an improvement-prompt response: the model sometimes quotes the
/// rewritten text. One pair of surrounding quotes is removed, then the
/// result is trimmed.
pub fn parse_improvement_response(raw: &str) -> String {
    let s = raw.strip_prefix('"').unwrap_or(raw);
    let s = s.strip_suffix('"').unwrap_or(s);
    s.trim().to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_PROJECT: &str = r#"{"nombre_proyecto":"X","cronograma":[]}"#;

    #[test]
    fn parses_bare_json() {
        let e = parse(MINIMAL_PROJECT).unwrap();
        assert_eq!(e.kind(), "proyecto");
    }

    #[test]
    fn fenced_and_noisy_inputs_are_equivalent() {
        let fenced = format!("```json\n{MINIMAL_PROJECT}\n```");
        let noisy = format!("noise before {MINIMAL_PROJECT} noise after");
        assert_eq!(parse(&fenced).unwrap(), parse(&noisy).unwrap());
    }

    #[test]
    fn fence_without_language_tag() {
        let fenced = format!("```\n{MINIMAL_PROJECT}\n```");
        assert!(parse(&fenced).is_ok());
    }

    #[test]
    fn project_priority_over_rubric() {
        let both = r#"{"nombre_proyecto":"X","cronograma":[],"criterios":[]}"#;
        assert_eq!(parse(both).unwrap().kind(), "proyecto");
    }

    #[test]
    fn rubric_signature_requires_array() {
        assert_eq!(
            parse(r#"{"criterios":[{"nombre":"Rigor"}]}"#).unwrap().kind(),
            "rubrica"
        );
        assert_eq!(
            parse(r#"{"criterios":"no es lista"}"#).unwrap_err(),
            ParseError::UnrecognizedShape
        );
    }

    #[test]
    fn instrument_signature() {
        let e = parse(
            r#"{"instrumento":"Lista de Cotejo","tipo":"lista_cotejo","items":[{"pregunta":"¿Terminó?"}]}"#,
        )
        .unwrap();
        assert_eq!(e.kind(), "instrumento");
    }

    #[test]
    fn no_json_found() {
        assert_eq!(parse("not json at all").unwrap_err(), ParseError::NoJsonFound);
        assert_eq!(parse("").unwrap_err(), ParseError::NoJsonFound);
    }

    #[test]
    fn invalid_json_carries_parser_message() {
        match parse("{not: valid}").unwrap_err() {
            ParseError::InvalidJson(msg) => assert!(!msg.is_empty()),
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_shape() {
        assert_eq!(
            parse(r#"{"foo":"bar"}"#).unwrap_err(),
            ParseError::UnrecognizedShape
        );
    }

    #[test]
    fn empty_string_signature_fields_do_not_classify() {
        // JS truthiness: "" fails the nombre_proyecto check.
        assert_eq!(
            parse(r#"{"nombre_proyecto":"","cronograma":[]}"#).unwrap_err(),
            ParseError::UnrecognizedShape
        );
    }

    #[test]
    fn prose_around_fences_is_ignored() {
        let input = format!("Aquí tienes tu plan:\n\n```json\n{MINIMAL_PROJECT}\n```\n\n¡Éxito!");
        assert!(parse(&input).is_ok());
    }

    #[test]
    fn improvement_response_strips_one_quote_pair() {
        assert_eq!(parse_improvement_response("\"mejor texto\""), "mejor texto");
        assert_eq!(parse_improvement_response("sin comillas"), "sin comillas");
        // Quotes that are not at the string edges survive.
        assert_eq!(parse_improvement_response("  \"texto\"  "), "\"texto\"");
    }
}
