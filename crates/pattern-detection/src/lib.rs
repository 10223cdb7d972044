//! Pattern detection strategies for stream-diff schema inference.
//!
//! Three interchangeable [`PatternDetector`] implementations, selected by
//! [`create_detector`] from configuration:
//!
//! - [`DisabledDetector`] - always proposes nothing
//! - [`OfflineDetector`] - built-in heuristics for common shapes (email,
//!   phone, URL, IPv4, UUID) with type-based fallbacks
//! - [`OnlineDetector`] - asks a text-generation provider for a single
//!   regex, behind the narrow [`CompletionProvider`] contract
//!
//! Constructing an online detector without credentials, or selecting an
//! unrecognized mode, fails fast at factory time with
//! [`DetectError::Config`] - before any data is read.

use diff_core::{DetectError, PatternDetector};
use serde::{Deserialize, Serialize};

mod disabled;
mod offline;
mod online;
mod provider;

pub use disabled::DisabledDetector;
pub use offline::OfflineDetector;
pub use online::OnlineDetector;
pub use provider::{AnthropicProvider, CompletionProvider};

/// Pattern detection configuration, typically loaded from the YAML config
/// file's `pattern_detection` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Detection mode: "offline" or "online"
    #[serde(default)]
    pub mode: String,

    /// Provider settings, required for online mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<OnlineConfig>,
}

/// Settings for the online provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineConfig {
    /// Provider name; "anthropic" and "claude" select the Anthropic
    /// messages API
    #[serde(default = "default_provider")]
    pub provider: String,

    pub api_key: String,

    /// Model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_provider() -> String {
    "anthropic".to_string()
}

/// Build the detector selected by the configuration.
///
/// A missing config or `enabled: false` yields the disabled detector.
pub fn create_detector(
    config: Option<&PatternConfig>,
) -> Result<Box<dyn PatternDetector>, DetectError> {
    let Some(config) = config.filter(|c| c.enabled) else {
        return Ok(Box::new(DisabledDetector));
    };

    match config.mode.as_str() {
        "offline" => Ok(Box::new(OfflineDetector::new())),
        "online" => {
            let online = config.online.as_ref().ok_or_else(|| {
                DetectError::Config(
                    "online pattern detection requires provider credentials".to_string(),
                )
            })?;
            Ok(Box::new(OnlineDetector::new(online)?))
        }
        other => Err(DetectError::Config(format!(
            "unsupported pattern detection mode: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diff_core::FieldType;
    use serde_json::json;

    #[tokio::test]
    async fn missing_or_disabled_config_selects_disabled() {
        let detector = create_detector(None).unwrap();
        let matchers = detector
            .detect_patterns("email", FieldType::String, &[json!("a@b.com")])
            .await
            .unwrap();
        assert!(matchers.is_empty());

        let config = PatternConfig {
            enabled: false,
            mode: "offline".to_string(),
            online: None,
        };
        assert!(create_detector(Some(&config)).is_ok());
    }

    #[test]
    fn unknown_mode_fails_at_factory_time() {
        let config = PatternConfig {
            enabled: true,
            mode: "telepathy".to_string(),
            online: None,
        };
        let err = create_detector(Some(&config)).unwrap_err();
        assert!(matches!(err, DetectError::Config(_)));
    }

    #[test]
    fn online_without_credentials_fails_at_factory_time() {
        let config = PatternConfig {
            enabled: true,
            mode: "online".to_string(),
            online: None,
        };
        assert!(matches!(
            create_detector(Some(&config)).unwrap_err(),
            DetectError::Config(_)
        ));

        let config = PatternConfig {
            enabled: true,
            mode: "online".to_string(),
            online: Some(OnlineConfig {
                provider: "anthropic".to_string(),
                api_key: String::new(),
                model: None,
                endpoint: None,
            }),
        };
        assert!(matches!(
            create_detector(Some(&config)).unwrap_err(),
            DetectError::Config(_)
        ));
    }

    #[test]
    fn offline_mode_constructs() {
        let config = PatternConfig {
            enabled: true,
            mode: "offline".to_string(),
            online: None,
        };
        assert!(create_detector(Some(&config)).is_ok());
    }
}
