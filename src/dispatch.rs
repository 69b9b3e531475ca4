//! Slack event dispatch
//!
//! Routes the inner `event` of an `event_callback` envelope to a handler by
//! its `type`. Handlers only log for now; every dispatch returns a
//! [`DispatchedEvent`] that the optional [`DispatchHook`] receives.

use std::sync::Arc;

use serde_json::Value;

use crate::models::{str_field, truncate_chars, Envelope, MESSAGE_TEXT_MAX_CHARS};

/// Observer called with the outcome of every dispatch
pub type DispatchHook = Arc<dyn Fn(&DispatchedEvent) + Send + Sync>;

/// Envelope fields that travel with an event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventContext {
    pub team_id: Option<String>,
    pub api_app_id: Option<String>,
    pub event_id: Option<String>,
    pub event_time: Option<i64>,
    pub authed_users: Option<Value>,
    pub authorizations: Option<Value>,
}

impl EventContext {
    pub fn from_envelope(envelope: &Envelope<'_>) -> Self {
        Self {
            team_id: envelope.team_id().map(str::to_string),
            api_app_id: envelope.api_app_id().map(str::to_string),
            event_id: envelope.event_id().map(str::to_string),
            event_time: envelope.event_time(),
            authed_users: envelope.authed_users().cloned(),
            authorizations: envelope.authorizations().cloned(),
        }
    }
}

/// What dispatch did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchedEvent {
    Message {
        user: Option<String>,
        channel: Option<String>,
        text: Option<String>,
    },
    /// Bot or system message, dropped to avoid reply loops
    IgnoredMessage {
        subtype: Option<String>,
        bot_id: Option<String>,
    },
    AppMention {
        user: Option<String>,
        channel: Option<String>,
        text: Option<String>,
    },
    MemberJoined {
        user: Option<String>,
        channel: Option<String>,
    },
    ReactionAdded {
        user: Option<String>,
        reaction: Option<String>,
        item_ts: Option<String>,
    },
    Unhandled {
        event_type: Option<String>,
    },
}

/// Dispatch an event by its `type`
pub fn dispatch_event(event: &Value, context: &EventContext) -> DispatchedEvent {
    let event_type = field(event, "type");
    let subtype = field(event, "subtype");

    tracing::debug!(
        event_type = ?event_type,
        subtype = ?subtype,
        team_id = ?context.team_id,
        api_app_id = ?context.api_app_id,
        event_id = ?context.event_id,
        event_time = ?context.event_time,
        has_authed_users = context.authed_users.is_some(),
        has_authorizations = context.authorizations.is_some(),
        "Processing event"
    );

    match event_type.as_deref() {
        Some("message") => handle_message(event),
        Some("app_mention") => handle_app_mention(event),
        Some("member_joined_channel") => handle_member_joined(event),
        Some("reaction_added") => handle_reaction_added(event),
        _ => {
            tracing::info!(event_type = ?event_type, "Unhandled event type");
            DispatchedEvent::Unhandled { event_type }
        }
    }
}

fn handle_message(event: &Value) -> DispatchedEvent {
    let bot_id = field(event, "bot_id");
    let subtype = field(event, "subtype");

    if bot_id.is_some() || subtype.is_some() {
        tracing::debug!(subtype = ?subtype, bot_id = ?bot_id, "Ignoring bot or system message");
        return DispatchedEvent::IgnoredMessage { subtype, bot_id };
    }

    let user = field(event, "user");
    let channel = field(event, "channel");
    let text = message_text(event);
    tracing::info!(user = ?user, channel = ?channel, text = ?text, "Message received");

    DispatchedEvent::Message { user, channel, text }
}

fn handle_app_mention(event: &Value) -> DispatchedEvent {
    let user = field(event, "user");
    let channel = field(event, "channel");
    let text = message_text(event);
    tracing::info!(user = ?user, channel = ?channel, text = ?text, "App mentioned");

    DispatchedEvent::AppMention { user, channel, text }
}

fn handle_member_joined(event: &Value) -> DispatchedEvent {
    let user = field(event, "user");
    let channel = field(event, "channel");
    tracing::info!(user = ?user, channel = ?channel, "Member joined channel");

    DispatchedEvent::MemberJoined { user, channel }
}

fn handle_reaction_added(event: &Value) -> DispatchedEvent {
    let user = field(event, "user");
    let reaction = field(event, "reaction");
    let item_ts = str_field(event.get("item"), "ts").map(str::to_string);
    tracing::info!(user = ?user, reaction = ?reaction, item_ts = ?item_ts, "Reaction added");

    DispatchedEvent::ReactionAdded { user, reaction, item_ts }
}

fn field(event: &Value, key: &str) -> Option<String> {
    str_field(Some(event), key)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn message_text(event: &Value) -> Option<String> {
    str_field(Some(event), "text").map(|t| truncate_chars(t, MESSAGE_TEXT_MAX_CHARS))
}
