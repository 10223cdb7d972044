//! AI-assisted pattern detection through a completion provider.

use async_trait::async_trait;
use diff_core::{value_to_string, DetectError, FieldType, Matcher, PatternDetector};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::offline::type_fallback;
use crate::provider::{AnthropicProvider, CompletionProvider};
use crate::OnlineConfig;

/// Reply meaning the provider found no usable pattern.
const NO_PATTERN: &str = "NO_PATTERN";

/// Distinct sample values included in the prompt.
const MAX_SAMPLES: usize = 10;

/// Detector that asks a text-generation provider for a single regex per
/// field. The provider reply must be either the `NO_PATTERN` sentinel or
/// a pattern that compiles; anything else fails the field's detection
/// with [`DetectError::InvalidPattern`].
pub struct OnlineDetector {
    provider: Box<dyn CompletionProvider>,
}

impl OnlineDetector {
    /// Build the detector from configuration, selecting the provider by
    /// name. Missing credentials and unknown providers are configuration
    /// errors.
    pub fn new(config: &OnlineConfig) -> Result<Self, DetectError> {
        if config.api_key.is_empty() {
            return Err(DetectError::Config(
                "an API key is required for online pattern detection".to_string(),
            ));
        }

        match config.provider.as_str() {
            "anthropic" | "claude" => Ok(Self {
                provider: Box::new(AnthropicProvider::new(config)?),
            }),
            other => Err(DetectError::Config(format!(
                "unsupported pattern detection provider: {other}"
            ))),
        }
    }

    /// Build the detector around an existing provider.
    pub fn with_provider(provider: Box<dyn CompletionProvider>) -> Self {
        Self { provider }
    }
}

/// Up to `MAX_SAMPLES` distinct stringified non-null values, in first-seen
/// order.
fn sample_values(values: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut samples = Vec::new();
    for value in values {
        if value.is_null() {
            continue;
        }
        let text = value_to_string(value);
        if seen.insert(text.clone()) {
            samples.push(text);
            if samples.len() == MAX_SAMPLES {
                break;
            }
        }
    }
    samples
}

fn build_prompt(field_name: &str, field_type: FieldType, samples: &[String]) -> String {
    format!(
        "Analyze the following data field and generate appropriate regex patterns if applicable.\n\
         \n\
         Field Name: {field_name}\n\
         Field Type: {field_type}\n\
         Sample Values:\n\
         {}\n\
         \n\
         Please analyze these values and determine if they follow a specific pattern that can be captured with a regex.\n\
         If a clear pattern exists (like email addresses, phone numbers, URLs, UUIDs, etc.), provide ONLY the regex pattern.\n\
         If no clear pattern exists, respond with \"{NO_PATTERN}\".\n\
         \n\
         Rules:\n\
         1. Only return a single regex pattern or \"{NO_PATTERN}\"\n\
         2. The pattern should match at least 80% of the provided samples\n\
         3. Focus on common data patterns: emails, phones, URLs, IDs, codes, etc.\n\
         4. Do not include explanations, just the regex or \"{NO_PATTERN}\"\n\
         \n\
         Response:",
        samples.join("\n"),
    )
}

fn parse_reply(reply: &str, field_type: FieldType) -> Result<Vec<Matcher>, DetectError> {
    let reply = reply.trim();
    if reply.is_empty() || reply == NO_PATTERN {
        return Ok(type_fallback(field_type));
    }

    if let Err(err) = Regex::new(reply) {
        return Err(DetectError::InvalidPattern {
            pattern: reply.to_string(),
            message: err.to_string(),
        });
    }

    Ok(vec![Matcher::Regex(reply.to_string())])
}

#[async_trait]
impl PatternDetector for OnlineDetector {
    async fn detect_patterns(
        &self,
        field_name: &str,
        field_type: FieldType,
        values: &[Value],
    ) -> Result<Vec<Matcher>, DetectError> {
        let samples = sample_values(values);
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = build_prompt(field_name, field_type, &samples);
        let reply = self.provider.complete(&prompt).await?;
        debug!(field = field_name, reply = %reply, "provider reply");

        parse_reply(&reply, field_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Provider that records the prompt and returns a canned reply.
    struct FakeProvider {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for FakeProvider {
        async fn complete(&self, prompt: &str) -> Result<String, DetectError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn compiling_reply_becomes_the_sole_regex_matcher() {
        let detector = OnlineDetector::with_provider(Box::new(FakeProvider::new(r"^\d{4}$")));
        let matchers = detector
            .detect_patterns("code", FieldType::String, &[json!("1234"), json!("5678")])
            .await
            .unwrap();
        assert_eq!(matchers, vec![Matcher::Regex(r"^\d{4}$".to_string())]);
    }

    #[tokio::test]
    async fn sentinel_reply_falls_back_to_the_type_predicate() {
        let detector = OnlineDetector::with_provider(Box::new(FakeProvider::new(NO_PATTERN)));
        let matchers = detector
            .detect_patterns("amount", FieldType::Numeric, &[json!(1), json!(2)])
            .await
            .unwrap();
        assert_eq!(matchers, vec![Matcher::IsNumeric]);

        let detector = OnlineDetector::with_provider(Box::new(FakeProvider::new("")));
        let matchers = detector
            .detect_patterns("note", FieldType::String, &[json!("x")])
            .await
            .unwrap();
        assert!(matchers.is_empty());
    }

    #[tokio::test]
    async fn uncompilable_reply_is_an_invalid_pattern_error() {
        let detector = OnlineDetector::with_provider(Box::new(FakeProvider::new("([unclosed")));
        let err = detector
            .detect_patterns("code", FieldType::String, &[json!("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, DetectError::InvalidPattern { .. }));
    }

    #[tokio::test]
    async fn prompt_contains_at_most_ten_distinct_samples() {
        let provider = Box::new(FakeProvider::new(NO_PATTERN));
        let values: Vec<Value> = (0..25).map(|i| json!(format!("v{}", i % 12))).collect();

        let detector = OnlineDetector::with_provider(provider);
        detector
            .detect_patterns("field", FieldType::String, &values)
            .await
            .unwrap();

        // Reach back into the detector's provider via a fresh fake to
        // validate the sampling helper directly as well.
        let samples = sample_values(&values);
        assert_eq!(samples.len(), 10);
        let distinct: HashSet<&String> = samples.iter().collect();
        assert_eq!(distinct.len(), 10);
    }

    #[tokio::test]
    async fn all_null_values_skip_the_provider() {
        struct Exploding;

        #[async_trait]
        impl CompletionProvider for Exploding {
            async fn complete(&self, _prompt: &str) -> Result<String, DetectError> {
                panic!("provider must not be called");
            }
        }

        let detector = OnlineDetector::with_provider(Box::new(Exploding));
        let matchers = detector
            .detect_patterns("field", FieldType::String, &[Value::Null])
            .await
            .unwrap();
        assert!(matchers.is_empty());
    }
}
