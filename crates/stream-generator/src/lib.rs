//! Schema-driven synthetic record stream
//!
//! Generates records matching a schema so pipelines can be exercised
//! without production data. Field values follow the declared type, with
//! name hints (`email`, `age`, `city`, ...) steering generation toward
//! realistic shapes. Per-field data patterns override the hints with
//! value lists, numeric ranges, or format templates.
//!
//! A fixed seed makes the stream reproducible, so two generators built
//! from the same schema, seed, and patterns emit identical records.

mod config;
mod generate;
mod patterns;

pub use config::{DataPattern, GeneratorConfig};
pub use generate::{GeneratorError, StreamGenerator};
pub use patterns::builtin_patterns;
