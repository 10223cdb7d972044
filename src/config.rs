//! YAML configuration for sources and comparison runs.
//!
//! Two file shapes exist: a source config ([`Config`]) describing one
//! source plus optional pattern detection, consumed by `schema`; and a
//! run config ([`RunConfig`]) describing both sources, the key field,
//! output paths, and periodic reporting, consumed by `compare`.

use diff_core::{PeriodicConfig, DEFAULT_SAMPLE_SIZE};
use pattern_detection::PatternConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use stream_generator::GeneratorConfig;

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

fn load_yaml<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
        path: path.display().to_string(),
        source,
    })
}

/// Single-source configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_detection: Option<PatternConfig>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_yaml(path.as_ref())
    }
}

/// One data source: where it lives and how to read it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source kind: `csv`, `json`, `proto`, or `stream`
    #[serde(rename = "type")]
    pub source_type: String,

    /// File path; unused for `stream` sources
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<ParserConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<SamplerConfig>,

    /// Settings for `stream` sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,
}

impl SourceConfig {
    pub fn json_in_string(&self) -> bool {
        self.parser.as_ref().is_some_and(|p| p.json_in_string)
    }

    /// Configured sample size, or the standard default when absent or
    /// zero.
    pub fn sample_size(&self) -> usize {
        match self.sampler.as_ref().map(|s| s.sample_size) {
            Some(size) if size > 0 => size,
            _ => DEFAULT_SAMPLE_SIZE,
        }
    }
}

/// Parsing options shared by the file-backed sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Recursively parse string values carrying embedded JSON
    pub json_in_string: bool,

    /// Message framing for `proto` sources: `json` (default) or `text`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// Schema-generation sampling options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Records to sample; zero means the standard default
    pub sample_size: usize,
}

/// Comparison run configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub source1: SourceConfig,
    pub source2: SourceConfig,

    /// Field identifying a record across both sources
    pub key_field: String,

    pub output: OutputConfig,
    pub periodic: PeriodicConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source1: SourceConfig::default(),
            source2: SourceConfig::default(),
            key_field: default_key_field(),
            output: OutputConfig::default(),
            periodic: PeriodicConfig::default(),
        }
    }
}

fn default_key_field() -> String {
    "id".to_string()
}

pub const DEFAULT_TIME_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_RECORD_INTERVAL: u64 = 1000;

impl RunConfig {
    /// Load a run configuration, filling in reporting-interval defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config: Self = load_yaml(path.as_ref())?;
        config.apply_defaults();
        Ok(config)
    }

    /// Zero intervals get the standard defaults; an explicit zero cannot
    /// be used to disable one trigger, disable `periodic` instead.
    pub fn apply_defaults(&mut self) {
        if self.periodic.time_interval_seconds == 0 {
            self.periodic.time_interval_seconds = DEFAULT_TIME_INTERVAL_SECONDS;
        }
        if self.periodic.record_interval == 0 {
            self.periodic.record_interval = DEFAULT_RECORD_INTERVAL;
        }
        if self.key_field.is_empty() {
            self.key_field = default_key_field();
        }
    }
}

/// Report output locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Final report file; `final_report.yaml` when empty
    pub final_report: String,

    /// Directory for periodic reports; disabled when empty
    pub periodic_reports: String,
}
