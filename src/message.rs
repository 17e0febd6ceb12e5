//! Wire messages — the tagged-variant protocol between clients and the relay.
//!
//! ARCHITECTURE
//! ============
//! Every WebSocket message is a JSON object with a `type` tag and camelCase
//! fields. Inbound text is classified into exactly one of three buckets:
//! a known [`ClientMessage`], an unknown-but-well-formed record (relayed
//! generically with the sender stamped on), or a malformed payload that is
//! logged and dropped. The dispatch layer never touches raw JSON for known
//! kinds — it matches on the closed enum.
//!
//! DESIGN
//! ======
//! - Unknown kinds are a passthrough path, not an error. New cosmetic client
//!   messages (cursor indicators and the like) flow through the relay without
//!   a server release.
//! - Known kinds with missing or mistyped fields are malformed, not
//!   passthrough: half-parsed state mutations must never reach the engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::services::session::MemberInfo;

/// Kinds the relay understands. Anything else is generic passthrough.
const KNOWN_KINDS: [&str; 7] = [
    "draw-start",
    "draw-move",
    "draw-end",
    "save-state",
    "undo",
    "redo",
    "clear",
];

// =============================================================================
// INBOUND
// =============================================================================

/// A message received from a client, dispatched by the `type` tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    DrawStart { x: f64, y: f64, color: String, size: f64 },
    #[serde(rename_all = "camelCase")]
    DrawMove { x: f64, y: f64, color: String, size: f64 },
    DrawEnd,
    #[serde(rename_all = "camelCase")]
    SaveState { state_data: String },
    Undo,
    Redo,
    Clear,
}

/// Classified inbound message.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// A kind the engine has a transition for.
    Known(ClientMessage),
    /// Well-formed record with an unrecognized tag; relayed to peers verbatim
    /// with the sender stamped on.
    Unknown(Map<String, Value>),
}

/// Why an inbound payload was dropped. Never fatal to the connection.
#[derive(Debug, thiserror::Error)]
pub enum InboundError {
    #[error("not valid json: {0}")]
    NotJson(#[from] serde_json::Error),
    #[error("payload is not an object with a string `type` tag")]
    NotTagged,
    #[error("malformed `{kind}` message: {reason}")]
    BadFields { kind: String, reason: String },
}

/// Parse and classify one inbound text frame.
///
/// # Errors
///
/// Returns [`InboundError`] when the text is not JSON, not a tagged object,
/// or carries a known tag with fields that do not parse. Callers log and
/// drop; the connection stays open.
pub fn parse_inbound(text: &str) -> Result<Inbound, InboundError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(record) = value else {
        return Err(InboundError::NotTagged);
    };
    let Some(kind) = record
        .get("type")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
    else {
        return Err(InboundError::NotTagged);
    };

    if !KNOWN_KINDS.contains(&kind.as_str()) {
        return Ok(Inbound::Unknown(record));
    }

    match serde_json::from_value::<ClientMessage>(Value::Object(record)) {
        Ok(msg) => Ok(Inbound::Known(msg)),
        Err(e) => Err(InboundError::BadFields { kind, reason: e.to_string() }),
    }
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// A message produced by the relay. Serialized once per broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// First message on every connection: the member's own identity.
    #[serde(rename_all = "camelCase")]
    Welcome { user_id: String, color: String, name: String },
    /// Full membership in registration order, sent on join.
    UserList { data: Vec<MemberInfo> },
    /// Current canvas snapshot, sent on join when history is non-empty.
    #[serde(rename_all = "camelCase")]
    CanvasState { state_index: i64, state_data: String },
    #[serde(rename_all = "camelCase")]
    UserJoined { user_id: String, color: String, name: String },
    #[serde(rename_all = "camelCase")]
    UserLeft { user_id: String },
    /// Request for clients to report their rendered canvas after a stroke.
    #[serde(rename_all = "camelCase")]
    SaveState { user_id: String },
    /// `state_data` is `null` when undoing back to the blank canvas.
    #[serde(rename_all = "camelCase")]
    Undo { state_index: i64, state_data: Option<String> },
    #[serde(rename_all = "camelCase")]
    Redo { state_index: i64, state_data: String },
    #[serde(rename_all = "camelCase")]
    Clear { user_id: String },
    /// Relayed stroke events, original fields plus the sender id.
    #[serde(rename_all = "camelCase")]
    DrawStart { user_id: String, x: f64, y: f64, color: String, size: f64 },
    #[serde(rename_all = "camelCase")]
    DrawMove { user_id: String, x: f64, y: f64, color: String, size: f64 },
}

impl ServerMessage {
    /// Serialize to the wire text. Infallible for this closed enum.
    #[must_use]
    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Stamp a passthrough record with the sender's id and color, then serialize.
#[must_use]
pub fn stamp_passthrough(mut record: Map<String, Value>, user_id: &str, user_color: &str) -> String {
    record.insert("userId".into(), Value::String(user_id.to_owned()));
    record.insert("userColor".into(), Value::String(user_color.to_owned()));
    serde_json::to_string(&Value::Object(record)).unwrap_or_default()
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
