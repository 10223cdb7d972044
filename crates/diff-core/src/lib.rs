//! Core types for the stream-diff framework.
//!
//! This crate provides the foundational pieces used across stream-diff:
//!
//! - [`Record`] and the [`RecordSource`] trait - how records enter the system
//! - [`Schema`], [`Field`], [`FieldType`], [`Matcher`] - the inferred shape of a stream
//! - [`collect_field_values`] - recursive field flattening into dotted paths
//! - [`infer_type`] - coarse type classification over sampled values
//! - [`generate_schema`] - sampling orchestration producing a [`Schema`]
//! - [`StreamComparator`] - key-based diffing of two sources with periodic reports
//!
//! # Architecture
//!
//! diff-core sits at the foundation of the workspace:
//!
//! ```text
//! diff-core (this crate)
//!    │
//!    ├─── pattern-detection   (implements PatternDetector)
//!    ├─── csv-source          (implements RecordSource)
//!    ├─── jsonl-source        (implements RecordSource)
//!    ├─── proto-source        (implements RecordSource)
//!    └─── stream-generator    (implements RecordSource)
//! ```
//!
//! # Example
//!
//! ```rust
//! use diff_core::{MemorySource, StreamComparator, PeriodicConfig};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let source1 = MemorySource::from_values(vec![json!({"id": 1, "name": "a"})]);
//! let source2 = MemorySource::from_values(vec![json!({"id": 1, "name": "b"})]);
//!
//! let comparator = StreamComparator::new(
//!     Box::new(source1),
//!     Box::new(source2),
//!     PeriodicConfig::default(),
//!     "id",
//!     None,
//! );
//! let result = comparator.compare().await.unwrap();
//! assert_eq!(result.matching_keys, 1);
//! # });
//! ```

pub mod comparator;
pub mod detect;
pub mod flatten;
pub mod generate;
pub mod infer;
pub mod memory;
pub mod record;
pub mod schema;

// Re-exports for convenience
pub use comparator::{
    ComparisonResult, CompareError, FieldDiff, PeriodicCallback, PeriodicConfig, StreamComparator,
};
pub use detect::{DetectError, PatternDetector};
pub use flatten::collect_field_values;
pub use generate::{generate_schema, DEFAULT_SAMPLE_SIZE};
pub use infer::infer_type;
pub use memory::MemorySource;
pub use record::{parse_embedded_json, value_to_string, Record, RecordSource, SourceError};
pub use schema::{Field, FieldType, Matcher, Schema, SchemaError};
