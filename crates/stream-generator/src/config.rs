//! Generator configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Configuration for a generated stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Schema describing the records to generate. When empty, a built-in
    /// demo schema is used.
    pub schema_path: Option<String>,

    /// Seed for reproducible output. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Stop after this many records. Zero means unbounded.
    pub max_records: u64,

    /// Throttle emission to this rate. Zero means unthrottled.
    pub records_per_second: f64,

    /// Per-field overrides of the name-hint generation.
    pub patterns: BTreeMap<String, DataPattern>,
}

/// How to generate values for one field, overriding type-based generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DataPattern {
    /// Pick uniformly from a fixed set of values.
    List { values: Vec<Value> },
    /// Uniform numeric range. Non-numeric fields get `min` as text.
    Range { min: f64, max: f64 },
    /// A named format (`email`, `phone`, `uuid`, `ip`, `mac`, `api_key`)
    /// or a template with `{id}` / `{random}` placeholders.
    Format { format: String },
}
