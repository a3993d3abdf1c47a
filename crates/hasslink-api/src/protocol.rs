//! Wire message shapes of the Home Assistant WebSocket API.
//!
//! Inbound frames are parsed into a loosely-typed [`InboundMessage`] that
//! keeps every field the hub sends. Outbound traffic is either the
//! authentication message (no id) or a [`Request`] that is stamped with a
//! correlation id at send time by [`encode_request`].

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::error::Error;

/// Path of the real-time API on the hub.
pub const WEBSOCKET_PATH: &str = "/api/websocket";

/// Build the socket endpoint for a hub, e.g. `ws://10.0.0.2:8123/api/websocket`.
pub fn endpoint_url(host: &str, port: u16, secure: bool) -> Result<Url, Error> {
    let scheme = if secure { "wss" } else { "ws" };
    let url = Url::parse(&format!("{scheme}://{host}:{port}{WEBSOCKET_PATH}"))?;
    Ok(url)
}

// ── Inbound ─────────────────────────────────────────────────────────

/// Any JSON object the hub sends.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundMessage {
    /// Correlation id. Absent on authentication messages.
    #[serde(default)]
    pub id: Option<u64>,

    /// Message type: `"auth_required"`, `"result"`, `"event"`, ...
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    /// Outcome flag on `result` messages.
    #[serde(default)]
    pub success: Option<bool>,

    /// Payload of a `result` message.
    #[serde(default)]
    pub result: Option<Value>,

    /// Payload of an `event` message.
    #[serde(default)]
    pub event: Option<Value>,

    /// Error object on failed `result` messages.
    #[serde(default)]
    pub error: Option<Value>,

    /// All remaining fields the hub sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Step of the authentication handshake an inbound message represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Required,
    Accepted,
    Rejected,
}

impl InboundMessage {
    /// Parse one text frame. Anything that is not a JSON object fails.
    pub fn parse(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: text.to_owned(),
        })
    }

    pub fn auth_phase(&self) -> Option<AuthPhase> {
        match self.kind.as_deref()? {
            "auth_required" => Some(AuthPhase::Required),
            "auth_ok" => Some(AuthPhase::Accepted),
            "auth_invalid" => Some(AuthPhase::Rejected),
            _ => None,
        }
    }

    /// `true` only when the hub explicitly reported `success: false`.
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }

    /// The `event.data` object of an event notification.
    pub fn event_data(&self) -> Option<&Map<String, Value>> {
        self.event.as_ref()?.get("data")?.as_object()
    }

    /// Elements of an array-valued `result`, or nothing.
    pub fn result_items(&self) -> &[Value] {
        self.result
            .as_ref()
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    /// Human-readable text attached to the message, if any
    /// (e.g. the reason on `auth_invalid`).
    pub fn message(&self) -> Option<&str> {
        self.extra.get("message").and_then(Value::as_str)
    }
}

// ── Outbound ────────────────────────────────────────────────────────

/// A correlated request. Serialized with its `type` tag; the `id` is
/// added by [`encode_request`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    GetStates,
    SubscribeEvents {
        event_type: String,
    },
    CallService {
        domain: String,
        service: String,
        service_data: Map<String, Value>,
    },
}

impl Request {
    /// The `type` tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GetStates => "get_states",
            Self::SubscribeEvents { .. } => "subscribe_events",
            Self::CallService { .. } => "call_service",
        }
    }
}

/// Serialize a request together with its correlation id.
pub fn encode_request(id: u64, request: &Request) -> Result<String, Error> {
    let mut value = serde_json::to_value(request).map_err(|e| Error::Serialization {
        message: e.to_string(),
    })?;
    if let Value::Object(ref mut obj) = value {
        obj.insert("id".into(), Value::from(id));
    }
    Ok(value.to_string())
}

#[derive(Serialize)]
struct AuthMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    access_token: &'a str,
}

/// The credential message answering `auth_required`.
pub fn encode_auth(access_token: &SecretString) -> Result<String, Error> {
    serde_json::to_string(&AuthMessage {
        kind: "auth",
        access_token: access_token.expose_secret(),
    })
    .map_err(|e| Error::Serialization {
        message: e.to_string(),
    })
}

// ── Tests ────────────────────────────────────────────────────────────
