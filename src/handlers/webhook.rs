//! Slack webhook handler
//!
//! Every request except `OPTIONS` is classified and recorded before anything
//! else happens, including requests that end up rejected.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, OriginalUri, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use super::health::StatusSummary;
use crate::analysis::classify_with_options;
use crate::dispatch::{dispatch_event, EventContext};
use crate::models::{Envelope, EnvelopeKind, InboundRequest, RequestRecord};
use crate::{AppError, AppResult, AppState};

/// Inspector endpoint: handshake, event intake, history and status
pub async fn handle(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Response> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    // Oversized or unreadable bodies are recorded as if none was sent
    let body = body.unwrap_or_else(|rejection| {
        tracing::warn!(error = %rejection, "Request body discarded");
        Bytes::new()
    });

    let payload = parse_body(&body);

    let classification =
        classify_with_options(&headers, payload.as_ref(), &state.config.classifier_options());
    tracing::debug!(
        source = %classification.source,
        confidence = %classification.confidence,
        details = %classification.details,
        "Request classified"
    );

    let record = RequestRecord::from_request(
        InboundRequest {
            method: &method,
            uri: &uri,
            headers: &headers,
            query: &query,
            body: payload.as_ref(),
            raw_body: &body,
        },
        classification,
        state.config.retain_raw_payload,
    );
    state.history.append(record);
    tracing::debug!(total = state.history.len(), "Request recorded");

    match query.get("action").map(String::as_str) {
        Some("history") => return Ok(Json(state.history.list()).into_response()),
        Some("clear") => {
            state.history.clear();
            tracing::info!("History cleared");
            return Ok(Json(json!({ "message": "History cleared" })).into_response());
        }
        _ => {}
    }

    if method == Method::POST {
        return handle_post(&state, payload.as_ref());
    }

    if method == Method::GET {
        return Ok(Json(StatusSummary::new(state.history.len())).into_response());
    }

    Err(AppError::MethodNotAllowed)
}

fn handle_post(state: &AppState, payload: Option<&Value>) -> AppResult<Response> {
    let envelope = Envelope::new(payload);

    tracing::info!(
        envelope_type = ?envelope.type_str(),
        team_id = ?envelope.team_id(),
        event_type = ?envelope.event_str("type"),
        "Slack POST request"
    );

    match envelope.kind() {
        Some(EnvelopeKind::UrlVerification) => {
            let challenge = envelope.challenge().ok_or(AppError::MissingChallenge)?;
            tracing::info!("URL verification challenge answered");
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        Some(EnvelopeKind::EventCallback) => Ok(acknowledge_event(state, &envelope)),
        None => Ok(ok_response()),
    }
}

/// Build the acknowledgment, then hand the event to a background task so
/// processing never delays it. The task may start before or after the
/// response is written.
fn acknowledge_event(state: &AppState, envelope: &Envelope<'_>) -> Response {
    let response = ok_response();

    let Some(event) = envelope.event().cloned() else {
        tracing::warn!("event_callback without event object");
        return response;
    };
    let context = EventContext::from_envelope(envelope);
    let hook = state.dispatch_hook.clone();

    tokio::spawn(async move {
        let outcome = dispatch_event(&event, &context);
        if let Some(hook) = hook {
            hook(&outcome);
        }
    });

    response
}

fn ok_response() -> Response {
    Json(json!({ "ok": true })).into_response()
}

/// JSON body if it parses; anything else counts as no body
fn parse_body(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Body is not JSON: {}", e);
            None
        }
    }
}
