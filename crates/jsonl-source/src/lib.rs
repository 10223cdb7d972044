//! Line-delimited JSON record source
//!
//! Reads one JSON object per line. Blank lines are skipped; a line that
//! is not valid JSON, or whose value is not an object, fails the read
//! with the 1-based line number.

mod source;

pub use source::JsonlSource;
