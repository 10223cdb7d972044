//! In-memory record source for tests and demos.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;

use crate::record::{Record, RecordSource, SourceError};

/// A [`RecordSource`] backed by a fixed list of records.
pub struct MemorySource {
    records: VecDeque<Record>,
}

impl MemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Build from JSON values; panics on non-object values, which is the
    /// convenient form for test fixtures.
    pub fn from_values(values: Vec<Value>) -> Self {
        let records = values
            .into_iter()
            .map(|value| match value {
                Value::Object(map) => map,
                other => panic!("MemorySource expects JSON objects, got {other}"),
            })
            .collect();
        Self { records }
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn read(&mut self) -> Result<Option<Record>, SourceError> {
        Ok(self.records.pop_front())
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        self.records.clear();
        Ok(())
    }
}
