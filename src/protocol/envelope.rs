use super::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One voice-platform invocation of the skill backend.
///
/// The hosting platform serializes turns per session, so a single envelope
/// is always processed to completion before the next one arrives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    /// Conversational session this turn belongs to
    pub session_id: String,

    /// Account-scoped player identifier, keys durable storage
    pub player_id: String,

    /// Locale of the requesting device, e.g. "en-US"
    pub locale: String,

    /// Capability flags of the requesting device
    #[serde(default)]
    pub device: DeviceCapabilities,

    /// When the platform stamped this request, milliseconds since the epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// The request payload itself
    pub request: Request,
}

/// Capability flags for the requesting device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceCapabilities {
    /// Whether the device can render the HTML game client
    pub html: bool,

    /// Whether the device listens for a wake word (false on push-to-talk remotes)
    pub wake_word: bool,
}

/// The discriminated request payload inside an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Cold start of the skill
    Launch(LaunchRequest),

    /// Return from an external flow, e.g. the commerce store
    ConnectionResponse(ConnectionResponse),

    /// A recognized voice intent
    Intent(IntentRequest),

    /// The platform closed the session
    SessionEnded(SessionEndedRequest),

    /// A batched message flushed by the game client
    ClientMessage(ClientMessageRequest),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchRequest {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionResponse {
    #[serde(default)]
    pub payload: ConnectionResult,
}

/// Result payload of a completed connection flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionResult {
    /// Outcome reported by the commerce store, e.g. "ACCEPTED" or "DECLINED"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_result: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRequest {
    pub intent: Intent,
}

/// A voice intent with its raw slot data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub slots: BTreeMap<String, Slot>,
}

/// One named slot as delivered by the platform, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Slot {
    /// The literal recognized value, if the recognizer settled on one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Resolver-authority candidates, in platform-supplied order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Resolutions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resolutions {
    pub resolutions_per_authority: Vec<ResolutionAuthority>,
}

/// One resolution authority, commonly the static catalog or a dynamic one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionAuthority {
    pub values: Vec<SlotValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotValue {
    pub value: ResolvedName,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedName {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionEndedRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessageRequest {
    pub message: Message,
}

impl Request {
    /// Serialize this request for verbatim passthrough inside a `Message`.
    pub fn to_raw(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
