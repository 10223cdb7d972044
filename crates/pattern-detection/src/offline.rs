//! Built-in heuristic pattern detection.

use async_trait::async_trait;
use diff_core::{value_to_string, DetectError, FieldType, Matcher, PatternDetector};
use regex::Regex;
use serde_json::Value;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const URL_PATTERN: &str = r"^https?://[^\s/$.?#].[^\s]*$";
const IPV4_PATTERN: &str = r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$";
const UUID_PATTERN: &str =
    r"^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";

// The matching pattern accepts bare 10-15 digit runs; the canonical
// pattern attached to the schema does not, so consumers stay strict.
const PHONE_MATCH_PATTERN: &str =
    r"^\+?[1-9]\d{1,14}$|^\(\d{3}\)\s\d{3}-\d{4}$|^\d{3}-\d{3}-\d{4}$|^\d{10,15}$";
const PHONE_CANONICAL_PATTERN: &str =
    r"^\+?[1-9]\d{1,14}$|^\(\d{3}\)\s\d{3}-\d{4}$|^\d{3}-\d{3}-\d{4}$";

/// Fraction of stringified values a category must match to win.
const MATCH_THRESHOLD: f64 = 0.8;

/// Heuristic detector: tries email, phone, URL, IPv4, and UUID in that
/// order; the first category clearing the threshold contributes its
/// canonical regex as the sole matcher. When nothing matches, numeric and
/// datetime fields fall back to their type predicate.
pub struct OfflineDetector {
    email: Regex,
    phone: Regex,
    url: Regex,
    ipv4: Regex,
    uuid: Regex,
}

impl Default for OfflineDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineDetector {
    pub fn new() -> Self {
        Self {
            email: Regex::new(EMAIL_PATTERN).expect("built-in pattern compiles"),
            phone: Regex::new(PHONE_MATCH_PATTERN).expect("built-in pattern compiles"),
            url: Regex::new(URL_PATTERN).expect("built-in pattern compiles"),
            ipv4: Regex::new(IPV4_PATTERN).expect("built-in pattern compiles"),
            uuid: Regex::new(UUID_PATTERN).expect("built-in pattern compiles"),
        }
    }

    fn detect_email(&self, values: &[String]) -> Option<String> {
        let matches = values.iter().filter(|v| self.email.is_match(v)).count();
        (ratio(matches, values.len()) > MATCH_THRESHOLD).then(|| EMAIL_PATTERN.to_string())
    }

    /// Phone numbers need extra care: short numeric codes (ages, ids)
    /// match the loose pattern, so values under 7 characters are ignored
    /// and most samples must be 7+ characters long.
    fn detect_phone(&self, values: &[String]) -> Option<String> {
        let matches = values
            .iter()
            .filter(|v| v.len() >= 7 && self.phone.is_match(v))
            .count();
        if ratio(matches, values.len()) <= MATCH_THRESHOLD {
            return None;
        }

        let long_values = values.iter().filter(|v| v.len() >= 7).count();
        (ratio(long_values, values.len()) > 0.5).then(|| PHONE_CANONICAL_PATTERN.to_string())
    }

    fn detect_url(&self, values: &[String]) -> Option<String> {
        let matches = values.iter().filter(|v| self.url.is_match(v)).count();
        (ratio(matches, values.len()) > MATCH_THRESHOLD).then(|| URL_PATTERN.to_string())
    }

    fn detect_ipv4(&self, values: &[String]) -> Option<String> {
        let matches = values.iter().filter(|v| self.ipv4.is_match(v)).count();
        (ratio(matches, values.len()) > MATCH_THRESHOLD).then(|| IPV4_PATTERN.to_string())
    }

    fn detect_uuid(&self, values: &[String]) -> Option<String> {
        let matches = values
            .iter()
            .filter(|v| self.uuid.is_match(&v.to_lowercase()))
            .count();
        (ratio(matches, values.len()) > MATCH_THRESHOLD).then(|| UUID_PATTERN.to_string())
    }
}

fn ratio(matches: usize, total: usize) -> f64 {
    matches as f64 / total as f64
}

/// Type-based fallback shared with the online detector.
pub(crate) fn type_fallback(field_type: FieldType) -> Vec<Matcher> {
    match field_type {
        FieldType::Numeric => vec![Matcher::IsNumeric],
        FieldType::Datetime => vec![Matcher::IsDateTime],
        _ => Vec::new(),
    }
}

#[async_trait]
impl PatternDetector for OfflineDetector {
    async fn detect_patterns(
        &self,
        _field_name: &str,
        field_type: FieldType,
        values: &[Value],
    ) -> Result<Vec<Matcher>, DetectError> {
        let strings: Vec<String> = values
            .iter()
            .filter(|v| !v.is_null())
            .map(value_to_string)
            .collect();
        if strings.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = self
            .detect_email(&strings)
            .or_else(|| self.detect_phone(&strings))
            .or_else(|| self.detect_url(&strings))
            .or_else(|| self.detect_ipv4(&strings))
            .or_else(|| self.detect_uuid(&strings));

        Ok(match pattern {
            Some(pattern) => vec![Matcher::Regex(pattern)],
            None => type_fallback(field_type),
        })
    }
}
