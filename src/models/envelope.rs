//! Slack Events API envelope
//!
//! Inbound bodies are untrusted and only partially shaped, so the envelope is
//! a read-only view over `serde_json::Value`. Every accessor returns `None`
//! when a field or any object on the way to it is missing or has the wrong type.

use serde_json::Value;

pub const URL_VERIFICATION: &str = "url_verification";
pub const EVENT_CALLBACK: &str = "event_callback";

/// Envelope types that Slack sends to an Events API endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    UrlVerification,
    EventCallback,
}

impl EnvelopeKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            URL_VERIFICATION => Some(EnvelopeKind::UrlVerification),
            EVENT_CALLBACK => Some(EnvelopeKind::EventCallback),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeKind::UrlVerification => URL_VERIFICATION,
            EnvelopeKind::EventCallback => EVENT_CALLBACK,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a> {
    body: Option<&'a Value>,
}

impl<'a> Envelope<'a> {
    pub fn new(body: Option<&'a Value>) -> Self {
        Self { body }
    }

    /// Raw `type` discriminator
    pub fn type_str(&self) -> Option<&'a str> {
        str_field(self.body, "type")
    }

    pub fn kind(&self) -> Option<EnvelopeKind> {
        self.type_str().and_then(EnvelopeKind::parse)
    }

    /// Handshake token, if present and non-empty
    pub fn challenge(&self) -> Option<&'a Value> {
        self.body?.get("challenge").filter(|v| is_truthy(v))
    }

    pub fn team_id(&self) -> Option<&'a str> {
        str_field(self.body, "team_id")
    }

    pub fn api_app_id(&self) -> Option<&'a str> {
        str_field(self.body, "api_app_id")
    }

    pub fn event_id(&self) -> Option<&'a str> {
        str_field(self.body, "event_id")
    }

    pub fn event_time(&self) -> Option<i64> {
        self.body?.get("event_time")?.as_i64()
    }

    pub fn authed_users(&self) -> Option<&'a Value> {
        self.body?.get("authed_users").filter(|v| !v.is_null())
    }

    pub fn authorizations(&self) -> Option<&'a Value> {
        self.body?.get("authorizations").filter(|v| !v.is_null())
    }

    /// Inner `event` object
    pub fn event(&self) -> Option<&'a Value> {
        self.body?.get("event").filter(|v| v.is_object())
    }

    /// String field of the inner `event` object
    pub fn event_str(&self, key: &str) -> Option<&'a str> {
        str_field(self.event(), key)
    }
}

/// String field of an optional JSON object
pub fn str_field<'a>(value: Option<&'a Value>, key: &str) -> Option<&'a str> {
    value?.get(key)?.as_str()
}

/// Null, false, zero and empty strings count as missing
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
