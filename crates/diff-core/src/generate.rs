//! Schema generation: sampling a source and assembling a [`Schema`].

use std::collections::BTreeMap;
use tracing::warn;

use crate::detect::PatternDetector;
use crate::flatten::{collect_field_values, FieldValues};
use crate::infer::infer_type;
use crate::record::{Record, RecordSource};
use crate::schema::{Field, Schema, SchemaError};

/// Number of records sampled when the caller does not specify a size.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Generate a schema by sampling up to `sample_size` records from the
/// source.
///
/// Stream exhaustion before the sample is full is not an error; an empty
/// sample yields a schema with no fields. Every sampled record is
/// flattened into one shared accumulator, then each field path is typed
/// and run through the pattern detector. A detector failure degrades that
/// field to an empty matcher list and generation continues.
///
/// The schema's `key` and `max_key_size` are left unset: key
/// identification from sampled data is not implemented, so callers supply
/// the key field through configuration.
pub async fn generate_schema(
    source: &mut dyn RecordSource,
    sample_size: usize,
    detector: &dyn PatternDetector,
) -> Result<Schema, SchemaError> {
    let records = sample_records(source, sample_size).await?;
    if records.is_empty() {
        return Ok(Schema::default());
    }

    let mut field_values = FieldValues::new();
    for record in &records {
        collect_field_values(record, &mut field_values);
    }

    let mut fields = BTreeMap::new();
    for (path, values) in field_values {
        let field_type = infer_type(&values);
        let matchers = match detector.detect_patterns(&path, field_type, &values).await {
            Ok(matchers) => matchers,
            Err(err) => {
                warn!(field = %path, error = %err, "pattern detection failed, continuing without matchers");
                Vec::new()
            }
        };
        fields.insert(
            path,
            Field {
                field_type,
                matchers,
            },
        );
    }

    // TODO: identify key and max_key_size from the sampled values
    Ok(Schema {
        key: String::new(),
        max_key_size: None,
        fields,
    })
}

async fn sample_records(
    source: &mut dyn RecordSource,
    sample_size: usize,
) -> Result<Vec<Record>, SchemaError> {
    let mut records = Vec::new();
    for _ in 0..sample_size {
        match source.read().await? {
            Some(record) => records.push(record),
            None => break,
        }
    }
    Ok(records)
}
