//! stream-diff library surface
//!
//! Configuration loading, the record-source factory, and report
//! persistence used by the `stream-diff` binary. The comparison and
//! schema-inference machinery lives in the `diff-core` crate; the
//! concrete sources live in their own crates and are wired together
//! here from configuration.

pub mod config;
pub mod report;
pub mod source;

pub use config::{
    Config, ConfigError, OutputConfig, ParserConfig, RunConfig, SamplerConfig, SourceConfig,
};
pub use source::{create_source, CreateSourceError};
