//! Field flattening: walking nested records into a flat path namespace.

use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};

use crate::record::Record;

/// Accumulator mapping flattened field path -> observed values.
pub type FieldValues = BTreeMap<String, Vec<Value>>;

/// Flatten one record into the shared accumulator.
///
/// Traversal is breadth-first over a work queue; order does not affect the
/// resulting path set. Rules:
///
/// - nulls are skipped entirely: they are not recorded under any path, so
///   sparse fields draw inferences only from their non-null values and an
///   always-null field ends up `unknown`
/// - a nested object is recorded at its own path (the object value itself),
///   then each child is enqueued under `prefix.key`
/// - an array is recorded at its own path, then every element is enqueued
///   under `prefix[]`; nested arrays collapse onto the same `[]` suffix
/// - scalars are recorded at their path
///
/// The root record itself is not a field: top-level values are enqueued
/// directly under their key, with no leading dot.
pub fn collect_field_values(record: &Record, field_values: &mut FieldValues) {
    let mut queue: VecDeque<(&Value, String)> = record
        .iter()
        .map(|(key, value)| (value, key.clone()))
        .collect();

    while let Some((value, path)) = queue.pop_front() {
        match value {
            Value::Null => {}
            Value::Object(map) => {
                field_values
                    .entry(path.clone())
                    .or_default()
                    .push(value.clone());
                for (key, child) in map {
                    queue.push_back((child, format!("{path}.{key}")));
                }
            }
            Value::Array(items) => {
                field_values
                    .entry(path.clone())
                    .or_default()
                    .push(value.clone());
                let element_path = format!("{path}[]");
                for item in items {
                    queue.push_back((item, element_path.clone()));
                }
            }
            _ => {
                field_values.entry(path).or_default().push(value.clone());
            }
        }
    }
}
