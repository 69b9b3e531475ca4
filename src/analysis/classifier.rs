//! Source Classifier
//!
//! Classification logic only. Input: request headers and parsed body.
//! Output: ClassificationResult
//!
//! Signature headers are checked for presence, never verified. A request
//! labelled `OfficialPlatform` is "shaped like Slack", not "proven to be Slack".

use std::borrow::Cow;

use axum::http::HeaderMap;
use serde_json::Value;
use url::Url;

use super::rules::{
    ClassifierOptions, API_TOOL_TOKENS, BROWSER_TOKENS, CONTENT_TYPE_HEADER, HOST_HEADER,
    JSON_CONTENT_TYPE, MISSING_USER_AGENT, PLATFORM_BOT_TOKENS, REFERER_HEADER, RETRY_NUM_HEADER,
    SIGNATURE_HEADER, TIMESTAMP_HEADER, USER_AGENT_DETAILS_MAX_CHARS, USER_AGENT_HEADER,
};
use crate::models::{truncate_chars, ClassificationResult, Confidence, Envelope, RequestSource};

// ============================================================================
// MAIN CLASSIFICATION FUNCTION
// ============================================================================

/// Classify a request. Rules are evaluated in priority order, first match wins.
pub fn classify_with_options(
    headers: &HeaderMap,
    body: Option<&Value>,
    options: &ClassifierOptions,
) -> ClassificationResult {
    let user_agent = header_str(headers, USER_AGENT_HEADER).unwrap_or_default();
    let user_agent: &str = &user_agent;
    let envelope = Envelope::new(body);

    // 1. Signed request
    if header_str(headers, SIGNATURE_HEADER).is_some() && header_str(headers, TIMESTAMP_HEADER).is_some() {
        let retry = if header_str(headers, RETRY_NUM_HEADER).is_some() { " + retry" } else { "" };
        return ClassificationResult::new(
            RequestSource::OfficialPlatform,
            Confidence::High,
            format!("signature + timestamp{retry}"),
        );
    }

    // 2. Envelope shape over JSON, only when explicitly trusted
    if options.trust_envelope_shape {
        if let Some(kind) = envelope.kind() {
            let is_json = header_str(headers, CONTENT_TYPE_HEADER)
                .is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_CONTENT_TYPE));
            if is_json {
                return ClassificationResult::new(
                    RequestSource::OfficialPlatform,
                    Confidence::High,
                    format!("{} envelope over JSON", kind.as_str()),
                );
            }
        }
    }

    // 3. Slack user-agent
    if contains_any(user_agent, PLATFORM_BOT_TOKENS) {
        return ClassificationResult::new(
            RequestSource::PlatformBot,
            Confidence::Medium,
            format!(
                "user-agent: {}",
                truncate_chars(user_agent, USER_AGENT_DETAILS_MAX_CHARS)
            ),
        );
    }

    // 4. Browser, split by whether it came from our own pages
    if contains_any(user_agent, BROWSER_TOKENS) {
        let product = user_agent.split(' ').next().unwrap_or_default();
        let details = format!("browser request ({product})");
        let source = if is_same_host_referer(headers) {
            RequestSource::DebugPage
        } else {
            RequestSource::ExternalBrowser
        };
        return ClassificationResult::new(source, Confidence::High, details);
    }

    // 5. API tools
    if contains_any(user_agent, API_TOOL_TOKENS) {
        let tool = user_agent.split('/').next().unwrap_or_default();
        return ClassificationResult::new(RequestSource::ApiTool, Confidence::High, tool);
    }

    // 6. Slack-shaped body without signature
    if let Some(kind) = envelope.kind() {
        return ClassificationResult::new(
            RequestSource::PossiblePlatformRequest,
            Confidence::Low,
            format!("{} envelope without signature headers", kind.as_str()),
        );
    }

    // 7. Fallback
    let details = if user_agent.is_empty() { MISSING_USER_AGENT } else { user_agent };
    ClassificationResult::new(RequestSource::Unknown, Confidence::Low, details)
}

// ============================================================================
// HELPERS
// ============================================================================

/// Header value as text, decoded lossily; only empty values count as absent.
///
/// `HeaderMap` normalizes names, so lookups are case-insensitive.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .filter(|v| !v.is_empty())
}

fn contains_any(haystack: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| haystack.contains(token))
}

/// Referer authority (host[:port]) equals the Host header
fn is_same_host_referer(headers: &HeaderMap) -> bool {
    let (Some(referer), Some(host)) = (
        header_str(headers, REFERER_HEADER),
        header_str(headers, HOST_HEADER),
    ) else {
        return false;
    };

    let Ok(url) = Url::parse(&referer) else {
        return false;
    };
    let Some(referer_host) = url.host_str() else {
        return false;
    };

    let authority = match url.port() {
        Some(port) => format!("{referer_host}:{port}"),
        None => referer_host.to_string(),
    };
    authority.eq_ignore_ascii_case(host.trim())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use serde_json::json;

    fn classify(headers: &HeaderMap, body: Option<&Value>) -> ClassificationResult {
        classify_with_options(headers, body, &ClassifierOptions::default())
    }

    const CHROME_UA: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_signed_request_is_official() {
        let h = headers(&[
            ("x-slack-signature", "v0=abc"),
            ("x-slack-request-timestamp", "1700000000"),
        ]);
        let result = classify(&h, None);
        assert_eq!(result.source, RequestSource::OfficialPlatform);
        assert_eq!(result.confidence, Confidence::High);
        assert!(result.is_platform_traffic);
        assert_eq!(result.details, "signature + timestamp");
    }

    #[test]
    fn test_signed_request_wins_over_any_user_agent() {
        for ua in [CHROME_UA, "curl/8.4.0", "Slackbot 1.0", ""] {
            let h = headers(&[
                ("X-Slack-Signature", "v0=abc"),
                ("X-Slack-Request-Timestamp", "1700000000"),
                ("User-Agent", ua),
            ]);
            assert_eq!(classify(&h, None).source, RequestSource::OfficialPlatform, "ua={ua}");
        }
    }

    #[test]
    fn test_retry_noted_in_details() {
        let h = headers(&[
            ("x-slack-signature", "v0=abc"),
            ("x-slack-request-timestamp", "1700000000"),
            ("x-slack-retry-num", "1"),
        ]);
        assert_eq!(classify(&h, None).details, "signature + timestamp + retry");
    }

    #[test]
    fn test_header_case_is_irrelevant() {
        let upper = headers(&[("X-Slack-Signature", "v0=abc"), ("X-SLACK-REQUEST-TIMESTAMP", "1")]);
        let lower = headers(&[("x-slack-signature", "v0=abc"), ("x-slack-request-timestamp", "1")]);
        assert_eq!(classify(&upper, None), classify(&lower, None));
    }

    #[test]
    fn test_signature_alone_is_not_enough() {
        let h = headers(&[("x-slack-signature", "v0=abc"), ("user-agent", "curl/8.4.0")]);
        assert_eq!(classify(&h, None).source, RequestSource::ApiTool);
    }

    #[test]
    fn test_empty_signature_counts_as_absent() {
        let h = headers(&[("x-slack-signature", ""), ("x-slack-request-timestamp", "1")]);
        assert_eq!(classify(&h, None).source, RequestSource::Unknown);
    }

    #[test]
    fn test_slack_user_agent() {
        let h = headers(&[("user-agent", "Slackbot-LinkExpanding 1.0 (+https://api.slack.com/robots)")]);
        let result = classify(&h, None);
        assert_eq!(result.source, RequestSource::PlatformBot);
        assert_eq!(result.confidence, Confidence::Medium);
        assert!(result.details.contains("Slackbot-LinkExpanding"));
    }

    #[test]
    fn test_platform_bot_details_truncated() {
        let ua = format!("Slackbot {}", "x".repeat(200));
        let h = headers(&[("user-agent", ua.as_str())]);
        let result = classify(&h, None);
        assert_eq!(result.details, format!("user-agent: {}", truncate_chars(&ua, USER_AGENT_DETAILS_MAX_CHARS)));
    }

    #[test]
    fn test_browser_from_own_page_is_debug_page() {
        let h = headers(&[
            ("user-agent", CHROME_UA),
            ("host", "hooks.example.com"),
            ("referer", "https://hooks.example.com/debug.html"),
        ]);
        let result = classify(&h, None);
        assert_eq!(result.source, RequestSource::DebugPage);
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.details, "browser request (Mozilla/5.0)");
    }

    #[test]
    fn test_browser_with_port_in_host() {
        let h = headers(&[
            ("user-agent", CHROME_UA),
            ("host", "localhost:3000"),
            ("referer", "http://localhost:3000/"),
        ]);
        assert_eq!(classify(&h, None).source, RequestSource::DebugPage);
    }

    #[test]
    fn test_browser_elsewhere_is_external() {
        let foreign = headers(&[
            ("user-agent", CHROME_UA),
            ("host", "hooks.example.com"),
            ("referer", "https://evil.example.org/hooks.example.com"),
        ]);
        assert_eq!(classify(&foreign, None).source, RequestSource::ExternalBrowser);

        let no_referer = headers(&[("user-agent", CHROME_UA), ("host", "hooks.example.com")]);
        assert_eq!(classify(&no_referer, None).source, RequestSource::ExternalBrowser);
    }

    #[test]
    fn test_non_ascii_user_agent_is_still_read() {
        let mut h = HeaderMap::new();
        h.insert(
            "user-agent",
            HeaderValue::from_bytes("Mozilla/5.0 (ü)".as_bytes()).unwrap(),
        );
        let result = classify(&h, None);
        assert_eq!(result.source, RequestSource::ExternalBrowser);
        assert_eq!(result.details, "browser request (Mozilla/5.0)");

        h.insert("user-agent", HeaderValue::from_bytes("curl/8 (é)".as_bytes()).unwrap());
        assert_eq!(classify(&h, None).source, RequestSource::ApiTool);
    }

    #[test]
    fn test_api_tools() {
        for (ua, tool) in [
            ("curl/8.4.0", "curl"),
            ("PostmanRuntime/7.36.0", "PostmanRuntime"),
            ("Wget/1.21.4", "Wget"),
        ] {
            let h = headers(&[("user-agent", ua)]);
            let result = classify(&h, None);
            assert_eq!(result.source, RequestSource::ApiTool, "ua={ua}");
            assert_eq!(result.details, tool);
            assert!(!result.is_platform_traffic);
        }
    }

    #[test]
    fn test_unsigned_envelope_is_possible_platform_request() {
        let body = json!({ "type": "event_callback", "event": { "type": "message" } });
        let h = headers(&[("content-type", "application/json")]);
        let result = classify(&h, Some(&body));
        assert_eq!(result.source, RequestSource::PossiblePlatformRequest);
        assert_eq!(result.confidence, Confidence::Low);
        assert!(result.details.contains("event_callback"));
        assert!(!result.is_platform_traffic);
    }

    #[test]
    fn test_trusted_envelope_shape() {
        let body = json!({ "type": "url_verification", "challenge": "abc" });
        let options = ClassifierOptions { trust_envelope_shape: true };

        let json = headers(&[("content-type", "application/json; charset=utf-8")]);
        let result = classify_with_options(&json, Some(&body), &options);
        assert_eq!(result.source, RequestSource::OfficialPlatform);
        assert_eq!(result.confidence, Confidence::High);

        let form = headers(&[("content-type", "application/x-www-form-urlencoded")]);
        let result = classify_with_options(&form, Some(&body), &options);
        assert_eq!(result.source, RequestSource::PossiblePlatformRequest);
    }

    #[test]
    fn test_api_tool_beats_envelope_shape() {
        let body = json!({ "type": "url_verification", "challenge": "abc" });
        let h = headers(&[("user-agent", "curl/8.4.0")]);
        assert_eq!(classify(&h, Some(&body)).source, RequestSource::ApiTool);
    }

    #[test]
    fn test_unknown_fallback() {
        let result = classify(&HeaderMap::new(), None);
        assert_eq!(result.source, RequestSource::Unknown);
        assert_eq!(result.confidence, Confidence::Low);
        assert_eq!(result.details, MISSING_USER_AGENT);

        let h = headers(&[("user-agent", "python-requests/2.31")]);
        assert_eq!(classify(&h, None).details, "python-requests/2.31");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let h = headers(&[("user-agent", CHROME_UA), ("host", "a"), ("referer", "http://a/")]);
        assert_eq!(classify(&h, None), classify(&h, None));
    }
}
