//! Reading line-framed message streams.

use async_trait::async_trait;
use diff_core::{parse_embedded_json, Record, RecordSource, SourceError};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// How messages are framed in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtoFormat {
    /// One JSON-serialized message per line.
    #[default]
    Json,
    /// One text-format message per line, kept verbatim under `raw_text`.
    Text,
}

impl FromStr for ProtoFormat {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "binary" => Err(SourceError::Unsupported(
                "binary message framing requires a descriptor and is not supported".to_string(),
            )),
            other => Err(SourceError::Unsupported(format!(
                "unsupported message framing: {other}"
            ))),
        }
    }
}

/// Record source over a line-framed message file.
pub struct ProtoSource {
    reader: BufReader<File>,
    format: ProtoFormat,
    line: u64,
    json_in_string: bool,
}

impl ProtoSource {
    pub fn open(
        path: impl AsRef<Path>,
        format: ProtoFormat,
        json_in_string: bool,
    ) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), ?format, "opened message source");

        Ok(Self {
            reader: BufReader::new(file),
            format,
            line: 0,
            json_in_string,
        })
    }

    fn parse_json_line(&self, text: &str) -> Result<Record, SourceError> {
        let value: Value = serde_json::from_str(text).map_err(|e| SourceError::Parse {
            line: self.line,
            message: format!("failed to parse JSON message: {e}"),
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
                message: format!("expected a JSON object message, got {other}"),
            }),
        }
    }
}

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
impl RecordSource for ProtoSource {
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

            return match self.format {
                ProtoFormat::Json => self.parse_json_line(text).map(Some),
                ProtoFormat::Text => {
                    let mut record = Record::new();
                    record.insert("raw_text".to_string(), Value::String(text.to_string()));
                    Ok(Some(record))
                }
            };
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

    fn message_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn json_framing_parses_each_line() {
        let file = message_file("{\"event\": \"click\", \"count\": 3}\n\n{\"event\": \"view\"}\n");
        let mut source = ProtoSource::open(file.path(), ProtoFormat::Json, false).unwrap();

        let first = source.read().await.unwrap().unwrap();
        assert_eq!(first["count"], json!(3));
        let second = source.read().await.unwrap().unwrap();
        assert_eq!(second["event"], json!("view"));
        assert!(source.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn text_framing_wraps_lines_verbatim() {
        let file = message_file("event: click\nevent: view\n");
        let mut source = ProtoSource::open(file.path(), ProtoFormat::Text, false).unwrap();

        let first = source.read().await.unwrap().unwrap();
        assert_eq!(first["raw_text"], json!("event: click"));
    }

    #[tokio::test]
    async fn json_in_string_expands_embedded_payloads() {
        let file = message_file("{\"meta\": \"{\\\"os\\\": \\\"linux\\\"}\"}\n");
        let mut source = ProtoSource::open(file.path(), ProtoFormat::Json, true).unwrap();

        let record = source.read().await.unwrap().unwrap();
        assert_eq!(record["meta"], json!({"os": "linux"}));
    }

    #[test]
    fn binary_framing_is_rejected() {
        assert!(matches!(
            "binary".parse::<ProtoFormat>(),
            Err(SourceError::Unsupported(_))
        ));
        assert_eq!("json".parse::<ProtoFormat>().unwrap(), ProtoFormat::Json);
        assert_eq!("text".parse::<ProtoFormat>().unwrap(), ProtoFormat::Text);
    }

    #[tokio::test]
    async fn malformed_json_reports_the_line() {
        let file = message_file("{\"ok\": true}\n{broken\n");
        let mut source = ProtoSource::open(file.path(), ProtoFormat::Json, false).unwrap();

        source.read().await.unwrap();
        assert!(matches!(
            source.read().await.unwrap_err(),
            SourceError::Parse { line: 2, .. }
        ));
    }
}
