//! Record-source factory.

use diff_core::{RecordSource, SourceError};
use stream_diff_csv_source::CsvSource;
use stream_diff_jsonl_source::JsonlSource;
use stream_diff_proto_source::{ProtoFormat, ProtoSource};
use stream_generator::{GeneratorError, StreamGenerator};
use tracing::debug;

use crate::config::SourceConfig;

/// Error constructing a source from configuration.
#[derive(Debug, thiserror::Error)]
pub enum CreateSourceError {
    #[error("unsupported source type: {0}")]
    UnsupportedType(String),

    #[error("generator configuration is required for stream sources")]
    MissingGenerator,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Build the record source described by the configuration.
pub fn create_source(config: &SourceConfig) -> Result<Box<dyn RecordSource>, CreateSourceError> {
    debug!(
        source_type = %config.source_type,
        path = %config.path,
        "creating record source"
    );

    let json_in_string = config.json_in_string();
    match config.source_type.as_str() {
        "csv" => Ok(Box::new(CsvSource::open(&config.path, json_in_string)?)),
        "json" | "jsonl" => Ok(Box::new(JsonlSource::open(&config.path, json_in_string)?)),
        "proto" | "protobuf" => {
            let format: ProtoFormat = config
                .parser
                .as_ref()
                .and_then(|p| p.format.as_deref())
                .unwrap_or("json")
                .parse()?;
            Ok(Box::new(ProtoSource::open(
                &config.path,
                format,
                json_in_string,
            )?))
        }
        "stream" => match &config.generator {
            Some(generator) => Ok(Box::new(StreamGenerator::from_config(generator)?)),
            None => Err(CreateSourceError::MissingGenerator),
        },
        other => Err(CreateSourceError::UnsupportedType(other.to_string())),
    }
}
