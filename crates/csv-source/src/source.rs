//! CSV file reading into records.

use async_trait::async_trait;
use diff_core::{parse_embedded_json, Record, RecordSource, SourceError};
use serde_json::Value;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Record source backed by a CSV file.
///
/// The first row is the header and provides the field names; every
/// subsequent row becomes one record. Cells beyond the header width are
/// dropped, matching the header-driven field mapping.
#[derive(Debug)]
pub struct CsvSource {
    reader: csv::Reader<File>,
    header: Vec<String>,
    json_in_string: bool,
}

impl CsvSource {
    /// Open a CSV file and read its header row. An empty file is a
    /// construction error, not an empty stream.
    pub fn open(path: impl AsRef<Path>, json_in_string: bool) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.display().to_string(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(file);

        let mut header_row = csv::StringRecord::new();
        let has_header = reader
            .read_record(&mut header_row)
            .map_err(|e| parse_error(&reader, e))?;
        if !has_header {
            return Err(SourceError::Parse {
                line: 1,
                message: format!("csv file {} is empty", path.display()),
            });
        }

        let header: Vec<String> = header_row.iter().map(str::to_string).collect();
        debug!(path = %path.display(), columns = header.len(), "opened csv source");

        Ok(Self {
            reader,
            header,
            json_in_string,
        })
    }

    fn cell_value(&self, cell: &str) -> Value {
        if self.json_in_string {
            parse_embedded_json(cell)
        } else {
            Value::String(cell.to_string())
        }
    }
}

fn parse_error(reader: &csv::Reader<File>, err: csv::Error) -> SourceError {
    SourceError::Parse {
        line: reader.position().line(),
        message: err.to_string(),
    }
}

#[async_trait]
impl RecordSource for CsvSource {
    async fn read(&mut self) -> Result<Option<Record>, SourceError> {
        let mut row = csv::StringRecord::new();
        let has_row = self
            .reader
            .read_record(&mut row)
            .map_err(|e| parse_error(&self.reader, e))?;
        if !has_row {
            return Ok(None);
        }

        let mut record = Record::new();
        for (i, cell) in row.iter().enumerate() {
            if let Some(name) = self.header.get(i) {
                record.insert(name.clone(), self.cell_value(cell));
            }
        }
        Ok(Some(record))
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        // The underlying file handle is released on drop.
        Ok(())
    }
}
