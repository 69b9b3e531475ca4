//! Request record model

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use axum::http::{HeaderMap, Method, Uri};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::classification::ClassificationResult;
use super::envelope::Envelope;
use crate::analysis::{header_str, rules};

/// Maximum characters of message text kept on a record
pub const MESSAGE_TEXT_MAX_CHARS: usize = 100;

/// One inbound request as seen by the webhook handler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub classification: ClassificationResult,
    pub event_type: Option<String>,
    pub event_sub_type: Option<String>,
    /// `"present"` when the body carried a handshake challenge
    pub challenge: Option<String>,
    pub team_id: Option<String>,
    pub user_id: Option<String>,
    pub channel_id: Option<String>,
    pub message_text: Option<String>,
    pub headers_snapshot: HeadersSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_query: Option<BTreeMap<String, String>>,
}

/// Allow-listed inbound headers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadersSnapshot {
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
    #[serde(rename = "content-type")]
    pub content_type: Option<String>,
    #[serde(rename = "x-slack-signature")]
    pub signature: Option<String>,
    #[serde(rename = "x-slack-request-timestamp")]
    pub request_timestamp: Option<String>,
    #[serde(rename = "x-slack-retry-num")]
    pub retry_num: Option<String>,
    pub host: Option<String>,
    pub referer: Option<String>,
}

impl HeadersSnapshot {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let copy = |name: &str| header_str(headers, name).map(Cow::into_owned);

        Self {
            user_agent: copy(rules::USER_AGENT_HEADER),
            content_type: copy(rules::CONTENT_TYPE_HEADER),
            signature: copy(rules::SIGNATURE_HEADER),
            request_timestamp: copy(rules::TIMESTAMP_HEADER),
            retry_num: copy(rules::RETRY_NUM_HEADER),
            host: copy(rules::HOST_HEADER),
            referer: copy(rules::REFERER_HEADER),
        }
    }
}

/// Borrowed view of the request being recorded
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub method: &'a Method,
    pub uri: &'a Uri,
    pub headers: &'a HeaderMap,
    pub query: &'a HashMap<String, String>,
    /// Parsed JSON body, if the body was JSON
    pub body: Option<&'a Value>,
    /// Body bytes as received
    pub raw_body: &'a [u8],
}

impl RequestRecord {
    /// Assemble a record from the request and its classification
    pub fn from_request(
        request: InboundRequest<'_>,
        classification: ClassificationResult,
        retain_raw_payload: bool,
    ) -> Self {
        let envelope = Envelope::new(request.body);

        let (raw_headers, raw_body, raw_query) = if retain_raw_payload {
            (
                Some(collect_headers(request.headers)),
                raw_body_value(request.body, request.raw_body),
                Some(request.query.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            )
        } else {
            (None, None, None)
        };

        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            method: request.method.to_string(),
            url: request.uri.to_string(),
            classification,
            event_type: envelope.type_str().map(str::to_string),
            event_sub_type: envelope.event_str("type").map(str::to_string),
            challenge: envelope.challenge().map(|_| "present".to_string()),
            team_id: envelope.team_id().map(str::to_string),
            user_id: envelope.event_str("user").map(str::to_string),
            channel_id: envelope.event_str("channel").map(str::to_string),
            message_text: envelope
                .event_str("text")
                .map(|text| truncate_chars(text, MESSAGE_TEXT_MAX_CHARS)),
            headers_snapshot: HeadersSnapshot::from_headers(request.headers),
            raw_headers,
            raw_body,
            raw_query,
        }
    }
}

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match out.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                out.insert(name.as_str().to_string(), value.into_owned());
            }
        }
    }
    out
}

fn raw_body_value(parsed: Option<&Value>, bytes: &[u8]) -> Option<Value> {
    match parsed {
        Some(value) => Some(value.clone()),
        None if bytes.is_empty() => None,
        None => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}
