//! The pattern detection capability consumed by schema generation.
//!
//! Implementations live in the `pattern-detection` crate; the trait sits
//! here so [`crate::generate_schema`] can accept any detector without a
//! dependency cycle.

use async_trait::async_trait;
use serde_json::Value;

use crate::schema::{FieldType, Matcher};

/// Error type for pattern detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// Invalid detector configuration: unsupported mode or missing
    /// credentials. Raised at construction, before any data is read.
    #[error("invalid pattern detection configuration: {0}")]
    Config(String),

    /// The backing provider call failed (transport or API error)
    #[error("pattern provider request failed: {0}")]
    Provider(String),

    /// The provider returned a pattern that does not compile
    #[error("provider returned an invalid regex pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Proposes zero or more validation matchers for a field, given its
/// sampled values and inferred type.
#[async_trait]
pub trait PatternDetector: Send + Sync {
    async fn detect_patterns(
        &self,
        field_name: &str,
        field_type: FieldType,
        values: &[Value],
    ) -> Result<Vec<Matcher>, DetectError>;
}

impl std::fmt::Debug for dyn PatternDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn PatternDetector")
    }
}
