//! Defensive normalization of server responses.
//!
//! Server bodies are opaque [`Value`]s at the boundary. The helpers here
//! narrow them into list shape after a runtime check instead of trusting the
//! server to always send what the endpoint documents.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

use crate::error::DEFAULT_ERROR_MESSAGE;

/// An opaque JSON record as returned by the backend.
pub type Record = Value;

/// Coarse shape of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListShape {
    /// A JSON array
    Sequence,
    /// A JSON object
    Object,
    /// JSON `null`, or an empty body
    Null,
    /// A string, number or boolean
    Scalar,
}

impl ListShape {
    /// Returns the shape name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Object => "object",
            Self::Null => "null",
            Self::Scalar => "scalar",
        }
    }
}

impl fmt::Display for ListShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies a value by shape.
#[must_use]
pub const fn classify(value: &Value) -> ListShape {
    match value {
        Value::Array(_) => ListShape::Sequence,
        Value::Object(_) => ListShape::Object,
        Value::Null => ListShape::Null,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => ListShape::Scalar,
    }
}

/// Returns the elements of `value` if it is an array, or an empty vector.
#[must_use]
pub fn ensure_array(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// Maps `f` over the elements of `value`, treating any non-array as empty.
pub fn safe_map<U, F>(value: &Value, f: F) -> Vec<U>
where
    F: FnMut(&Value) -> U,
{
    match value {
        Value::Array(items) => items.iter().map(f).collect(),
        _ => Vec::new(),
    }
}

/// Decodes each record into `T`, dropping the ones that do not fit.
pub fn decode_records<T>(records: Vec<Record>) -> Vec<T>
where
    T: DeserializeOwned,
{
    let total = records.len();
    let decoded: Vec<T> = records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(error = %err, "dropping record that failed to decode");
                None
            }
        })
        .collect();

    if decoded.len() != total {
        warn!(total, kept = decoded.len(), "some records were dropped");
    }
    decoded
}

/// Parses a response body leniently.
///
/// Empty bodies become `null`, non-JSON text becomes a JSON string.
#[must_use]
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Picks the user-facing message out of an error response body.
///
/// A non-empty string `message` field on a JSON object wins and is returned
/// verbatim, whitespace included; everything else yields
/// [`DEFAULT_ERROR_MESSAGE`].
#[must_use]
pub fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(|value| value.get("message"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map_or_else(|| DEFAULT_ERROR_MESSAGE.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ensure_array_keeps_sequences() {
        let items = ensure_array(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(items, vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[test]
    fn ensure_array_drops_everything_else() {
        for value in [json!({"error": "bad"}), Value::Null, json!("text"), json!(7)] {
            assert!(ensure_array(value).is_empty());
        }
    }

    #[test]
    fn classify_reports_shape() {
        assert_eq!(classify(&json!([])), ListShape::Sequence);
        assert_eq!(classify(&json!({})), ListShape::Object);
        assert_eq!(classify(&Value::Null), ListShape::Null);
        assert_eq!(classify(&json!(true)), ListShape::Scalar);
        assert_eq!(ListShape::Object.to_string(), "object");
    }

    #[test]
    fn safe_map_on_object_is_empty() {
        let ids: Vec<Option<i64>> = safe_map(&json!({"id": 1}), |v| v["id"].as_i64());
        assert!(ids.is_empty());

        let ids: Vec<Option<i64>> = safe_map(&json!([{"id": 1}, {"id": 2}]), |v| v["id"].as_i64());
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn decode_records_skips_bad_entries() {
        #[derive(Deserialize)]
        struct Item {
            id: u32,
        }

        let items: Vec<Item> = decode_records(vec![json!({"id": 1}), json!({"id": "x"})]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 1);
    }

    #[test]
    fn parse_body_is_lenient() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("  \n"), Value::Null);
        assert_eq!(parse_body(r#"{"id":3}"#), json!({"id": 3}));
        assert_eq!(parse_body("created"), json!("created"));
    }

    #[test]
    fn extract_error_message_prefers_message_field() {
        assert_eq!(extract_error_message(r#"{"message":"X"}"#), "X");
        assert_eq!(
            extract_error_message(r#"{"message":"cannot delete","code":7}"#),
            "cannot delete"
        );
    }

    #[test]
    fn extract_error_message_keeps_whitespace_messages_verbatim() {
        assert_eq!(extract_error_message(r#"{"message":"  "}"#), "  ");
        assert_eq!(extract_error_message(r#"{"message":" in use\n"}"#), " in use\n");
    }

    #[test]
    fn extract_error_message_falls_back() {
        for body in [
            "",
            "<html>Bad Gateway</html>",
            r#"{"error":"bad"}"#,
            r#"{"message":42}"#,
            r#"{"message":""}"#,
            r#"["message"]"#,
        ] {
            assert_eq!(extract_error_message(body), DEFAULT_ERROR_MESSAGE, "body: {body}");
        }
    }
}
