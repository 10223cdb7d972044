//! Line-framed structured message source
//!
//! Reads protobuf-style message streams that have been serialized one
//! message per line. The common `json` framing parses each line as a JSON
//! object; `text` framing wraps each line under a `raw_text` field.
//! Binary framing needs a message descriptor and is rejected up front.

mod source;

pub use source::{ProtoFormat, ProtoSource};
