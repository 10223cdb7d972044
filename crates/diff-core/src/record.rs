//! Record representation and the record source contract.

use async_trait::async_trait;
use serde_json::Value;

/// A single record from a data source, like a CSV row or a JSON object.
///
/// Field order is irrelevant; the backing map is keyed by field name.
/// Values are JSON values: null, string, number, boolean, nested object,
/// or array.
pub type Record = serde_json::Map<String, Value>;

/// Error type for record source operations.
///
/// End of stream is not an error: [`RecordSource::read`] signals it by
/// returning `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Failed to open the underlying file or resource
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while reading
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be parsed
    #[error("failed to parse record at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// The requested source configuration is not supported
    #[error("{0}")]
    Unsupported(String),
}

/// The contract every record source satisfies: read one record at a time,
/// then close.
///
/// Reads may block on I/O but execution stays strictly sequential; there is
/// no cancellation primitive. Callers wanting early termination must make
/// the source fail or stop reading.
#[async_trait]
pub trait RecordSource: Send {
    /// Read the next record, or `Ok(None)` once the stream is exhausted.
    async fn read(&mut self) -> Result<Option<Record>, SourceError>;

    /// Release any underlying resources.
    async fn close(&mut self) -> Result<(), SourceError>;
}

/// Canonical textual form of a value, used for key extraction, field
/// comparison, and type/pattern analysis.
///
/// Strings render without quotes; everything else uses its JSON rendering
/// (objects and arrays deterministically, since record maps are ordered by
/// key).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Recursively interpret a string as embedded JSON.
///
/// Sources carrying JSON payloads inside string cells (CSV columns, message
/// fields) use this to surface the nested structure to schema inference.
/// Anything that does not parse stays a plain string. String values nested
/// inside parsed objects and arrays are themselves re-parsed.
pub fn parse_embedded_json(s: &str) -> Value {
    if s.is_empty() {
        return Value::String(String::new());
    }

    match serde_json::from_str::<Value>(s) {
        Err(_) => Value::String(s.to_string()),
        Ok(Value::String(inner)) => parse_embedded_json(&inner),
        Ok(Value::Object(map)) => Value::Object(
            map.into_iter()
                .map(|(key, value)| match value {
                    Value::String(s) => (key, parse_embedded_json(&s)),
                    other => (key, other),
                })
                .collect(),
        ),
        Ok(Value::Array(items)) => Value::Array(
            items
                .into_iter()
                .map(|value| match value {
                    Value::String(s) => parse_embedded_json(&s),
                    other => other,
                })
                .collect(),
        ),
        Ok(other) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stringify_strips_quotes_from_strings() {
        assert_eq!(value_to_string(&json!("hello")), "hello");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&Value::Null), "null");
    }

    #[test]
    fn embedded_json_parses_objects() {
        let parsed = parse_embedded_json(r#"{"a": 1, "b": "x"}"#);
        assert_eq!(parsed, json!({"a": 1, "b": "x"}));
    }

    #[test]
    fn embedded_json_recurses_into_nested_strings() {
        let parsed = parse_embedded_json(r#"{"payload": "{\"inner\": 2}"}"#);
        assert_eq!(parsed, json!({"payload": {"inner": 2}}));
    }

    #[test]
    fn embedded_json_keeps_plain_strings() {
        assert_eq!(parse_embedded_json("not json"), json!("not json"));
        assert_eq!(parse_embedded_json(""), json!(""));
    }
}
