//! The no-op detector used when pattern detection is turned off.

use async_trait::async_trait;
use diff_core::{DetectError, FieldType, Matcher, PatternDetector};
use serde_json::Value;

/// Always proposes an empty matcher list.
pub struct DisabledDetector;

#[async_trait]
impl PatternDetector for DisabledDetector {
    async fn detect_patterns(
        &self,
        _field_name: &str,
        _field_type: FieldType,
        _values: &[Value],
    ) -> Result<Vec<Matcher>, DetectError> {
        Ok(Vec::new())
    }
}
