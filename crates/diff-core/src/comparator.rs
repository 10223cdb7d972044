//! Key-based diffing of two record streams with periodic reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::record::{value_to_string, Record, RecordSource, SourceError};

/// Error type for stream comparison.
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// Reading from one of the sources failed
    #[error("error reading from {label}: {source}")]
    Source {
        label: &'static str,
        #[source]
        source: SourceError,
    },

    /// The periodic report callback failed; the whole comparison aborts
    #[error("periodic report callback failed: {0}")]
    Callback(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Periodic reporting thresholds.
///
/// A report triggers when reporting is enabled and either the configured
/// time interval has elapsed since the last report, or the configured
/// number of records has been processed since the last report. A zero
/// interval disables that trigger.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PeriodicConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub time_interval_seconds: u64,
    #[serde(default)]
    pub record_interval: u64,
}

/// A difference in one field between two records with the same key.
///
/// A side is `None` when the field does not exist in that source's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub field: String,
    pub source1_value: Option<Value>,
    pub source2_value: Option<Value>,
}

/// The outcome of comparing two streams, materialized fresh for every
/// periodic trigger and once at the end. Never mutated after creation.
///
/// Key lists are sorted and value diffs are keyed by a sorted map, so two
/// runs over the same inputs produce identical results apart from the
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub timestamp: DateTime<Utc>,
    pub records_processed: u64,
    pub source1_records: u64,
    pub source2_records: u64,
    pub matching_keys: u64,
    pub identical_rows: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys_only_in_source1: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys_only_in_source2: Vec<String>,
    #[serde(
        default,
        rename = "value_diffs_by_key",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub value_diffs: BTreeMap<String, Vec<FieldDiff>>,
    pub is_periodic_report: bool,
}

/// Callback invoked synchronously for every periodic report. An error
/// aborts the comparison.
pub type PeriodicCallback =
    Box<dyn FnMut(&ComparisonResult) -> Result<(), Box<dyn std::error::Error + Send + Sync>> + Send>;

/// Compares two record streams by key.
///
/// Source1 is drained completely before source2 is touched. As a
/// consequence, periodic snapshots emitted while source1 is still
/// draining report every source1 key as only-in-source1, because
/// source2's map is empty at that point. This matches the tool's
/// historical behavior for file-backed sources; it makes early periodic
/// reports structurally misleading for genuinely interleaved streams.
///
/// Every distinct key ever seen stays resident until the comparison
/// finishes, so peak memory is proportional to the number of unique keys
/// across both streams.
pub struct StreamComparator {
    source1: Box<dyn RecordSource>,
    source2: Box<dyn RecordSource>,
    periodic: PeriodicConfig,
    key_field: String,
    on_periodic: Option<PeriodicCallback>,
}

impl StreamComparator {
    pub fn new(
        source1: Box<dyn RecordSource>,
        source2: Box<dyn RecordSource>,
        periodic: PeriodicConfig,
        key_field: impl Into<String>,
        on_periodic: Option<PeriodicCallback>,
    ) -> Self {
        Self {
            source1,
            source2,
            periodic,
            key_field: key_field.into(),
            on_periodic,
        }
    }

    /// Drain both sources and return the final comparison result.
    ///
    /// Records missing the key field contribute to the counters but are
    /// not stored in the key maps. Any read error aborts immediately with
    /// the source identity; a failing periodic callback aborts the whole
    /// comparison.
    pub async fn compare(mut self) -> Result<ComparisonResult, CompareError> {
        let mut map1: BTreeMap<String, Record> = BTreeMap::new();
        let mut map2: BTreeMap<String, Record> = BTreeMap::new();

        let mut records_processed: u64 = 0;
        let mut source1_records: u64 = 0;
        let mut source2_records: u64 = 0;

        let mut last_report_time = Instant::now();
        let mut last_report_records: u64 = 0;

        // Phase 1: drain source1 fully.
        loop {
            let record = self
                .source1
                .read()
                .await
                .map_err(|source| CompareError::Source {
                    label: "source1",
                    source,
                })?;
            let Some(record) = record else { break };

            source1_records += 1;
            records_processed += 1;
            if let Some(key) = record_key(&record, &self.key_field) {
                map1.insert(key, record);
            }

            if should_report(
                &self.periodic,
                last_report_time,
                records_processed,
                last_report_records,
            ) {
                let result = build_result(
                    &map1,
                    &map2,
                    records_processed,
                    source1_records,
                    source2_records,
                    true,
                );
                if let Some(callback) = self.on_periodic.as_mut() {
                    callback(&result).map_err(CompareError::Callback)?;
                }
                last_report_time = Instant::now();
                last_report_records = records_processed;
            }
        }

        // Phase 2: drain source2 fully.
        loop {
            let record = self
                .source2
                .read()
                .await
                .map_err(|source| CompareError::Source {
                    label: "source2",
                    source,
                })?;
            let Some(record) = record else { break };

            source2_records += 1;
            records_processed += 1;
            if let Some(key) = record_key(&record, &self.key_field) {
                map2.insert(key, record);
            }

            if should_report(
                &self.periodic,
                last_report_time,
                records_processed,
                last_report_records,
            ) {
                let result = build_result(
                    &map1,
                    &map2,
                    records_processed,
                    source1_records,
                    source2_records,
                    true,
                );
                if let Some(callback) = self.on_periodic.as_mut() {
                    callback(&result).map_err(CompareError::Callback)?;
                }
                last_report_time = Instant::now();
                last_report_records = records_processed;
            }
        }

        Ok(build_result(
            &map1,
            &map2,
            records_processed,
            source1_records,
            source2_records,
            false,
        ))
    }
}

/// Stringified value of the key field, or `None` when the record does not
/// carry it (or no key field is configured).
fn record_key(record: &Record, key_field: &str) -> Option<String> {
    if key_field.is_empty() {
        return None;
    }
    record.get(key_field).map(value_to_string)
}

fn should_report(
    periodic: &PeriodicConfig,
    last_report_time: Instant,
    records_processed: u64,
    last_report_records: u64,
) -> bool {
    if !periodic.enabled {
        return false;
    }

    if periodic.time_interval_seconds > 0
        && last_report_time.elapsed().as_secs() >= periodic.time_interval_seconds
    {
        return true;
    }

    periodic.record_interval > 0
        && records_processed - last_report_records >= periodic.record_interval
}

fn build_result(
    map1: &BTreeMap<String, Record>,
    map2: &BTreeMap<String, Record>,
    records_processed: u64,
    source1_records: u64,
    source2_records: u64,
    is_periodic_report: bool,
) -> ComparisonResult {
    let keys_only_in_source1: Vec<String> = map1
        .keys()
        .filter(|key| !map2.contains_key(*key))
        .cloned()
        .collect();
    let keys_only_in_source2: Vec<String> = map2
        .keys()
        .filter(|key| !map1.contains_key(*key))
        .cloned()
        .collect();

    let mut matching_keys = 0;
    let mut identical_rows = 0;
    let mut value_diffs = BTreeMap::new();

    for (key, record1) in map1 {
        if let Some(record2) = map2.get(key) {
            matching_keys += 1;
            let diffs = compare_records(record1, record2);
            if diffs.is_empty() {
                identical_rows += 1;
            } else {
                value_diffs.insert(key.clone(), diffs);
            }
        }
    }

    ComparisonResult {
        timestamp: Utc::now(),
        records_processed,
        source1_records,
        source2_records,
        matching_keys,
        identical_rows,
        keys_only_in_source1,
        keys_only_in_source2,
        value_diffs,
        is_periodic_report,
    }
}

/// Field-by-field comparison over the union of both records' field names,
/// sorted by field path. A field differs when it is missing from either
/// side or its stringified values differ.
fn compare_records(record1: &Record, record2: &Record) -> Vec<FieldDiff> {
    let fields: BTreeSet<&String> = record1.keys().chain(record2.keys()).collect();

    let mut diffs = Vec::new();
    for field in fields {
        let value1 = record1.get(field);
        let value2 = record2.get(field);

        let differs = match (value1, value2) {
            (Some(v1), Some(v2)) => value_to_string(v1) != value_to_string(v2),
            (None, None) => false,
            _ => true,
        };

        if differs {
            diffs.push(FieldDiff {
                field: field.clone(),
                source1_value: value1.cloned(),
                source2_value: value2.cloned(),
            });
        }
    }
    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn source(values: Vec<Value>) -> Box<dyn RecordSource> {
        Box::new(MemorySource::from_values(values))
    }

    fn fixture_sources() -> (Box<dyn RecordSource>, Box<dyn RecordSource>) {
        let source1 = source(vec![
            json!({"id": 1, "name": "alice", "city": "Berlin"}),
            json!({"id": 2, "name": "bob", "city": "Oslo"}),
            json!({"id": 3, "name": "carol", "city": "Lima"}),
        ]);
        let source2 = source(vec![
            json!({"id": 1, "name": "alice", "city": "Munich"}),
            json!({"id": 2, "name": "bob", "city": "Oslo"}),
            json!({"id": 4, "name": "dave", "city": "Quito"}),
        ]);
        (source1, source2)
    }

    #[tokio::test]
    async fn final_result_partitions_keys() {
        let (source1, source2) = fixture_sources();
        let comparator = StreamComparator::new(
            source1,
            source2,
            PeriodicConfig::default(),
            "id",
            None,
        );
        let result = comparator.compare().await.unwrap();

        assert_eq!(result.records_processed, 6);
        assert_eq!(result.source1_records, 3);
        assert_eq!(result.source2_records, 3);
        assert_eq!(result.matching_keys, 2);
        assert_eq!(result.identical_rows, 1);
        assert_eq!(result.keys_only_in_source1, vec!["3"]);
        assert_eq!(result.keys_only_in_source2, vec!["4"]);
        assert!(!result.is_periodic_report);

        // Record 1 differs in exactly one field.
        assert_eq!(result.value_diffs.len(), 1);
        let diffs = &result.value_diffs["1"];
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].field, "city");
        assert_eq!(diffs[0].source1_value, Some(json!("Berlin")));
        assert_eq!(diffs[0].source2_value, Some(json!("Munich")));
    }

    #[tokio::test]
    async fn fields_missing_on_one_side_count_as_diffs() {
        let source1 = source(vec![json!({"id": 1, "only1": "x", "both": "a"})]);
        let source2 = source(vec![json!({"id": 1, "only2": "y", "both": "b"})]);

        let result = StreamComparator::new(
            source1,
            source2,
            PeriodicConfig::default(),
            "id",
            None,
        )
        .compare()
        .await
        .unwrap();

        let diffs = &result.value_diffs["1"];
        assert_eq!(
            diffs.iter().map(|d| d.field.as_str()).collect::<Vec<_>>(),
            vec!["both", "only1", "only2"]
        );
        assert_eq!(diffs[1].source2_value, None);
        assert_eq!(diffs[2].source1_value, None);
    }

    #[tokio::test]
    async fn records_without_key_are_counted_but_not_stored() {
        let source1 = source(vec![
            json!({"id": 1, "v": "a"}),
            json!({"v": "no key here"}),
        ]);
        let source2 = source(vec![json!({"id": 1, "v": "a"})]);

        let result = StreamComparator::new(
            source1,
            source2,
            PeriodicConfig::default(),
            "id",
            None,
        )
        .compare()
        .await
        .unwrap();

        assert_eq!(result.source1_records, 2);
        assert_eq!(result.matching_keys, 1);
        assert_eq!(result.identical_rows, 1);
        assert!(result.keys_only_in_source1.is_empty());
    }

    #[tokio::test]
    async fn record_interval_fires_periodic_reports() {
        let (source1, source2) = fixture_sources();
        let seen: Arc<Mutex<Vec<ComparisonResult>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let periodic = PeriodicConfig {
            enabled: true,
            time_interval_seconds: 0,
            record_interval: 1,
        };
        let callback: PeriodicCallback = Box::new(move |result| {
            sink.lock().unwrap().push(result.clone());
            Ok(())
        });

        let result = StreamComparator::new(source1, source2, periodic, "id", Some(callback))
            .compare()
            .await
            .unwrap();

        let reports = seen.lock().unwrap();
        assert_eq!(reports.len(), 6);
        assert!(reports.iter().all(|r| r.is_periodic_report));
        assert!(!result.is_periodic_report);

        // During phase 1 source2's map is still empty, so every source1
        // key shows up as only-in-source1.
        assert_eq!(reports[2].keys_only_in_source1, vec!["1", "2", "3"]);
        assert!(reports[2].keys_only_in_source2.is_empty());
    }

    /// Delays every read so elapsed wall time, not record count, drives
    /// the periodic trigger.
    struct SlowSource {
        inner: MemorySource,
        delay: std::time::Duration,
    }

    #[async_trait::async_trait]
    impl RecordSource for SlowSource {
        async fn read(&mut self) -> Result<Option<Record>, SourceError> {
            tokio::time::sleep(self.delay).await;
            self.inner.read().await
        }

        async fn close(&mut self) -> Result<(), SourceError> {
            self.inner.close().await
        }
    }

    #[tokio::test]
    async fn time_interval_fires_and_resets_between_reports() {
        let records: Vec<Value> = (1..=6).map(|i| json!({"id": i, "v": "x"})).collect();
        let slow = SlowSource {
            inner: MemorySource::from_values(records),
            delay: std::time::Duration::from_millis(600),
        };
        let seen: Arc<Mutex<Vec<ComparisonResult>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let periodic = PeriodicConfig {
            enabled: true,
            time_interval_seconds: 1,
            record_interval: 0,
        };
        let callback: PeriodicCallback = Box::new(move |result| {
            sink.lock().unwrap().push(result.clone());
            Ok(())
        });

        let result =
            StreamComparator::new(Box::new(slow), source(vec![]), periodic, "id", Some(callback))
                .compare()
                .await
                .unwrap();

        // Reads arrive every 600ms, so the 1s timer comes due on at most
        // every other read. If the timer did not reset after a report,
        // every read past the first second would fire (five reports);
        // with the reset only two or three can.
        let reports = seen.lock().unwrap();
        assert!(
            (2..=4).contains(&reports.len()),
            "expected a handful of time-triggered reports, got {}",
            reports.len()
        );
        assert!(reports.iter().all(|r| r.is_periodic_report));
        assert!(!result.is_periodic_report);
        assert_eq!(result.source1_records, 6);
    }

    #[tokio::test]
    async fn callback_error_aborts_the_comparison() {
        let (source1, source2) = fixture_sources();
        let periodic = PeriodicConfig {
            enabled: true,
            time_interval_seconds: 0,
            record_interval: 1,
        };
        let callback: PeriodicCallback = Box::new(|_| Err("report sink full".into()));

        let err = StreamComparator::new(source1, source2, periodic, "id", Some(callback))
            .compare()
            .await
            .unwrap_err();
        assert!(matches!(err, CompareError::Callback(_)));
    }

    #[tokio::test]
    async fn disabled_periodic_never_fires() {
        let (source1, source2) = fixture_sources();
        let fired = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&fired);

        let periodic = PeriodicConfig {
            enabled: false,
            time_interval_seconds: 0,
            record_interval: 1,
        };
        let callback: PeriodicCallback = Box::new(move |_| {
            *counter.lock().unwrap() += 1;
            Ok(())
        });

        StreamComparator::new(source1, source2, periodic, "id", Some(callback))
            .compare()
            .await
            .unwrap();
        assert_eq!(*fired.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn repeated_runs_are_identical_except_timestamp() {
        let run = || async {
            let (source1, source2) = fixture_sources();
            StreamComparator::new(source1, source2, PeriodicConfig::default(), "id", None)
                .compare()
                .await
                .unwrap()
        };

        let first = run().await;
        let mut second = run().await;
        second.timestamp = first.timestamp;
        assert_eq!(first, second);
    }
}
