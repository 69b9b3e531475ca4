//! Source Classification Rules
//!
//! Header names and user-agent markers used by the classifier.
//! No classification logic here, only constants and options.

// ============================================================================
// HEADERS
// ============================================================================

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
pub const RETRY_NUM_HEADER: &str = "x-slack-retry-num";
pub const USER_AGENT_HEADER: &str = "user-agent";
pub const CONTENT_TYPE_HEADER: &str = "content-type";
pub const HOST_HEADER: &str = "host";
pub const REFERER_HEADER: &str = "referer";

pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// USER-AGENT MARKERS (case-sensitive substring match)
// ============================================================================

/// Slack's own crawlers and link unfurlers
pub const PLATFORM_BOT_TOKENS: &[&str] = &["Slackbot", "Slack"];

/// General-purpose browsers
pub const BROWSER_TOKENS: &[&str] = &["Mozilla", "Chrome", "Safari"];

/// Command-line and API tools
pub const API_TOOL_TOKENS: &[&str] = &["curl", "wget", "Wget", "Postman", "HTTPie", "insomnia"];

/// Longest user-agent echoed into platform-bot details
pub const USER_AGENT_DETAILS_MAX_CHARS: usize = 80;

pub const MISSING_USER_AGENT: &str = "no user-agent";

// ============================================================================
// OPTIONS
// ============================================================================

/// Runtime switches for the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifierOptions {
    /// Accept a JSON Slack envelope as official traffic without signature headers
    pub trust_envelope_shape: bool,
}
