/// Address-lines normalization
/// The agent side sends this field in whatever shape the model produced:
/// a plain string, a JSON-encoded string, a flat list, or a list with
/// nested lists inside. Every shape is decoded exhaustively here, once.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// How forgiving the decoder is about shapes outside the known four.
/// Tolerant coerces them into a best-effort single line; strict rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Tolerant,
    Strict,
}

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address_lines must be a string or a list of strings")]
    Undecodable,
}

/// Raw `address_lines` payload, as deserialized from the tool call.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAddressLines {
    /// Plain string, possibly JSON-encoded by a confused model
    Text(String),
    /// Proper list, possibly with nested lists inside
    Lines(Vec<AddressLine>),
    /// Anything else (object, number, null)
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AddressLine {
    Line(String),
    Nested(Vec<String>),
    Other(Value),
}

impl RawAddressLines {
    /// Reduce to the flat ordered list of strings the upstream validator
    /// expects. This runs before the first upstream call, always.
    pub fn normalize(&self, mode: ValidationMode) -> Result<Vec<String>, AddressError> {
        match self {
            RawAddressLines::Text(text) => Ok(decode_text(text)),
            RawAddressLines::Lines(lines) => {
                let mut out = Vec::new();
                for line in lines {
                    match line {
                        AddressLine::Line(s) => out.push(s.clone()),
                        AddressLine::Nested(items) => out.extend(items.iter().cloned()),
                        AddressLine::Other(value) => match mode {
                            ValidationMode::Tolerant => flatten_value(value, &mut out),
                            ValidationMode::Strict => return Err(AddressError::Undecodable),
                        },
                    }
                }
                Ok(out)
            }
            RawAddressLines::Other(value) => match mode {
                ValidationMode::Tolerant => Ok(vec![stringify(value)]),
                ValidationMode::Strict => Err(AddressError::Undecodable),
            },
        }
    }
}

/// A string payload may itself be JSON ("[\"10 Downing St\"]"). Parse it
/// first; on parse failure the whole string is one address line.
fn decode_text(text: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => {
            let mut out = Vec::new();
            for item in &items {
                flatten_value(item, &mut out);
            }
            out
        }
        Ok(Value::String(inner)) => vec![inner],
        Ok(other) => vec![stringify(&other)],
        Err(_) => vec![text.to_string()],
    }
}

fn flatten_value(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => {
            for item in items {
                flatten_value(item, out);
            }
        }
        other => out.push(other.to_string()),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Retry trigger for the one-shot flattening fallback: the validator names
/// both the failing field and the expected list type when it rejects a
/// malformed payload.
pub fn is_schema_complaint(body: &str) -> bool {
    body.contains("list_type") && body.contains("address_lines")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> RawAddressLines {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_plain_string_becomes_single_line() {
        let raw = decode(json!("10 Downing Street, Westminster"));
        let lines = raw.normalize(ValidationMode::Strict).unwrap();
        assert_eq!(lines, vec!["10 Downing Street, Westminster"]);
    }

    #[test]
    fn test_json_encoded_string_is_parsed() {
        let raw = decode(json!("[\"10 Downing Street\", \"Westminster\"]"));
        let lines = raw.normalize(ValidationMode::Strict).unwrap();
        assert_eq!(lines, vec!["10 Downing Street", "Westminster"]);
    }

    #[test]
    fn test_flat_list_passes_through() {
        let raw = decode(json!(["221B Baker Street", "London"]));
        let lines = raw.normalize(ValidationMode::Strict).unwrap();
        assert_eq!(lines, vec!["221B Baker Street", "London"]);
    }

    #[test]
    fn test_nested_list_is_flattened() {
        let raw = decode(json!([["221B Baker Street", "Marylebone"], "London"]));
        let lines = raw.normalize(ValidationMode::Strict).unwrap();
        assert_eq!(lines, vec!["221B Baker Street", "Marylebone", "London"]);
    }

    #[test]
    fn test_encoded_nested_list_is_flattened() {
        let raw = decode(json!("[[\"20 Station Road\"], \"Harrow\"]"));
        let lines = raw.normalize(ValidationMode::Tolerant).unwrap();
        assert_eq!(lines, vec!["20 Station Road", "Harrow"]);
    }

    #[test]
    fn test_tolerant_mode_coerces_unknown_shapes() {
        let raw = decode(json!({ "line1": "somewhere" }));
        let lines = raw.normalize(ValidationMode::Tolerant).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("somewhere"));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_shapes() {
        let raw = decode(json!({ "line1": "somewhere" }));
        assert!(raw.normalize(ValidationMode::Strict).is_err());

        let raw = decode(json!(42));
        assert!(raw.normalize(ValidationMode::Strict).is_err());
    }

    #[test]
    fn test_normalize_is_idempotent_on_flat_output() {
        let raw = decode(json!([["a"], "b", ["c", "d"]]));
        let first = raw.normalize(ValidationMode::Tolerant).unwrap();
        let again = decode(json!(first.clone()))
            .normalize(ValidationMode::Strict)
            .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_schema_complaint_needs_both_markers() {
        assert!(is_schema_complaint(
            r#"{"detail":[{"type":"list_type","loc":["body","address_lines"]}]}"#
        ));
        assert!(!is_schema_complaint(r#"{"detail":"postcode is invalid"}"#));
        assert!(!is_schema_complaint(r#"{"detail":"list_type mismatch on postcode"}"#));
    }
}
