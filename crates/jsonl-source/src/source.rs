//! Line-by-line JSON object reading.

use async_trait::async_trait;
use diff_core::{parse_embedded_json, Record, RecordSource, SourceError};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Record source backed by a line-delimited JSON file.
pub struct JsonlSource {
    reader: BufReader<File>,
    line: u64,
    json_in_string: bool,
}

impl JsonlSource {
    pub fn open(path: impl AsRef<Path>, json_in_string: bool) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "opened jsonl source");

        Ok(Self {
            reader: BufReader::new(file),
            line: 0,
            json_in_string,
        })
    }

    fn parse_line(&self, text: &str) -> Result<Record, SourceError> {
        let value: Value = serde_json::from_str(text).map_err(|e| SourceError::Parse {
            line: self.line,
            message: e.to_string(),
        })?;

        let value = if self.json_in_string {
            reparse_strings(value)
        } else {
            value
        };

        match value {
            Value::Object(record) => Ok(record),
            other => Err(SourceError::Parse {
                line: self.line,
                message: format!("expected a JSON object, got {other}"),
            }),
        }
    }
}

/// Re-parse string members that carry embedded JSON payloads.
fn reparse_strings(value: Value) -> Value {
    match value {
        Value::String(s) => parse_embedded_json(&s),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, reparse_strings(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(reparse_strings).collect()),
        other => other,
    }
}

#[async_trait]
impl RecordSource for JsonlSource {
    async fn read(&mut self) -> Result<Option<Record>, SourceError> {
        loop {
            let mut buf = String::new();
            let bytes = self.reader.read_line(&mut buf)?;
            if bytes == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = buf.trim();
            if text.is_empty() {
                continue;
            }
            return self.parse_line(text).map(Some);
        }
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn jsonl_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn reads_one_object_per_line() {
        let file = jsonl_file("{\"id\": 1}\n{\"id\": 2, \"name\": \"bob\"}\n");
        let mut source = JsonlSource::open(file.path(), false).unwrap();

        let first = source.read().await.unwrap().unwrap();
        assert_eq!(first["id"], json!(1));
        let second = source.read().await.unwrap().unwrap();
        assert_eq!(second["name"], json!("bob"));
        assert!(source.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let file = jsonl_file("\n{\"id\": 1}\n\n   \n{\"id\": 2}\n");
        let mut source = JsonlSource::open(file.path(), false).unwrap();

        assert!(source.read().await.unwrap().is_some());
        assert!(source.read().await.unwrap().is_some());
        assert!(source.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_json_reports_the_line_number() {
        let file = jsonl_file("{\"id\": 1}\nnot json\n");
        let mut source = JsonlSource::open(file.path(), false).unwrap();

        source.read().await.unwrap();
        let err = source.read().await.unwrap_err();
        match err {
            SourceError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_object_lines_are_rejected() {
        let file = jsonl_file("[1, 2, 3]\n");
        let mut source = JsonlSource::open(file.path(), false).unwrap();
        assert!(matches!(
            source.read().await.unwrap_err(),
            SourceError::Parse { line: 1, .. }
        ));
    }

    #[tokio::test]
    async fn json_in_string_expands_nested_payloads() {
        let file =
            jsonl_file("{\"id\": 1, \"meta\": \"{\\\"device\\\": \\\"phone\\\"}\"}\n");
        let mut source = JsonlSource::open(file.path(), true).unwrap();

        let record = source.read().await.unwrap().unwrap();
        assert_eq!(record["meta"], json!({"device": "phone"}));
    }
}
