//! Request source classification types
//!
//! Data only. The decision logic lives in `analysis::classifier`.

use serde::{Deserialize, Serialize};

// ============================================================================
// REQUEST SOURCE
// ============================================================================

/// Likely origin of an inbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestSource {
    /// Carries Slack signature and timestamp headers
    OfficialPlatform,
    /// Slack user-agent without signature headers (link unfurling, bots)
    PlatformBot,
    /// Browser request coming from this service's own pages
    DebugPage,
    /// Browser request from anywhere else
    ExternalBrowser,
    /// curl, Postman and friends
    ApiTool,
    /// Slack-shaped body without any signature headers
    PossiblePlatformRequest,
    Unknown,
}

impl RequestSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestSource::OfficialPlatform => "official_platform",
            RequestSource::PlatformBot => "platform_bot",
            RequestSource::DebugPage => "debug_page",
            RequestSource::ExternalBrowser => "external_browser",
            RequestSource::ApiTool => "api_tool",
            RequestSource::PossiblePlatformRequest => "possible_platform_request",
            RequestSource::Unknown => "unknown",
        }
    }

    /// Whether the source counts as Slack traffic.
    ///
    /// Header presence is a heuristic, not proof of origin: nothing here
    /// verifies the request signature.
    pub fn is_platform_traffic(&self) -> bool {
        matches!(self, RequestSource::OfficialPlatform | RequestSource::PlatformBot)
    }
}

impl std::fmt::Display for RequestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CONFIDENCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Result of source classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub source: RequestSource,
    pub is_platform_traffic: bool,
    pub confidence: Confidence,
    pub details: String,
}

impl ClassificationResult {
    pub fn new(source: RequestSource, confidence: Confidence, details: impl Into<String>) -> Self {
        Self {
            source,
            is_platform_traffic: source.is_platform_traffic(),
            confidence,
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let result = ClassificationResult::new(
            RequestSource::OfficialPlatform,
            Confidence::High,
            "signature + timestamp",
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "official_platform");
        assert_eq!(json["isPlatformTraffic"], true);
        assert_eq!(json["confidence"], "high");
        assert_eq!(json["details"], "signature + timestamp");
    }

    #[test]
    fn test_platform_traffic_flag() {
        assert!(RequestSource::PlatformBot.is_platform_traffic());
        assert!(!RequestSource::PossiblePlatformRequest.is_platform_traffic());
        assert!(!RequestSource::DebugPage.is_platform_traffic());
    }
}
