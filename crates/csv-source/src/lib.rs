//! Delimited-text record source
//!
//! Reads a CSV file one row at a time, mapping the header row to field
//! names. With `json_in_string` enabled, string cells carrying embedded
//! JSON payloads are parsed recursively so nested structure is visible to
//! schema inference.

mod source;

pub use source::CsvSource;
