//! Schema types describing the inferred shape of a record stream.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::record::SourceError;

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading a schema file
    #[error("failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("failed to parse schema YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Sampling from the record source failed
    #[error("failed to sample records: {0}")]
    Source(#[from] SourceError),
}

/// Coarse type of a schema field, inferred from sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Numeric,
    String,
    Datetime,
    Boolean,
    Object,
    Array,
    /// No non-null values were observed for the field
    Unknown,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Numeric => "numeric",
            FieldType::String => "string",
            FieldType::Datetime => "datetime",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Declarative description of an expected value shape.
///
/// Matchers are attached to fields by pattern detection; the core never
/// executes them against future data, consumers apply them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// Values are expected to match this regular expression
    Regex(String),
    /// Values are expected to parse as numbers
    IsNumeric,
    /// Values are expected to parse as date/time
    IsDateTime,
}

/// One schema field, keyed in [`Schema::fields`] by its flattened path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Inferred coarse type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Expected value shapes proposed by pattern detection
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matchers: Vec<Matcher>,
}

impl Field {
    /// Create a field with no matchers.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            matchers: Vec::new(),
        }
    }
}

/// The inferred structural schema of one record source.
///
/// Created once per source by [`crate::generate_schema`] and read-only
/// afterwards. Field paths are dot-joined, with a literal `[]` segment for
/// array traversal (e.g. `profile.devices[]`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Field path designating the record identifier. Empty when
    /// undetermined; schema generation does not identify it (see
    /// [`crate::generate_schema`]), so callers supply it via configuration.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,

    /// Optional bound on key length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_key_size: Option<usize>,

    /// Field path -> field, one entry per distinct path observed while
    /// sampling
    #[serde(default)]
    pub fields: BTreeMap<String, Field>,
}

impl Schema {
    /// Load a schema from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Serialize the schema to a YAML string.
    pub fn to_yaml(&self) -> Result<String, SchemaError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_yaml_round_trip() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "email".to_string(),
            Field {
                field_type: FieldType::String,
                matchers: vec![Matcher::Regex("^.+@.+$".to_string())],
            },
        );
        fields.insert("age".to_string(), Field::new(FieldType::Numeric));

        let schema = Schema {
            key: "user_id".to_string(),
            max_key_size: Some(64),
            fields,
        };

        let yaml = schema.to_yaml().unwrap();
        let parsed: Schema = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, schema);
    }

    #[test]
    fn matchers_serialize_as_tagged_variants() {
        let yaml = serde_yaml::to_string(&vec![
            Matcher::Regex("^a$".to_string()),
            Matcher::IsNumeric,
            Matcher::IsDateTime,
        ])
        .unwrap();
        assert!(yaml.contains("regex"));
        assert!(yaml.contains("is_numeric"));
        assert!(yaml.contains("is_date_time"));
    }

    #[test]
    fn empty_key_is_omitted_from_yaml() {
        let schema = Schema::default();
        let yaml = schema.to_yaml().unwrap();
        assert!(!yaml.contains("key"));
    }
}
