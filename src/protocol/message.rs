use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One multiplexed frame on the client<->skill channel.
///
/// Every key is an independent optional channel; any subset may travel in a
/// single frame and consumers must process all keys that are present, not
/// just the first they recognize. Keys this crate does not know about are
/// preserved in `extra` so forward-compatible extensions still reach
/// application logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Message {
    /// Origin timestamp in milliseconds, echoed back as a spoken latency report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,

    /// Literal text to vocalize through the platform's native audio path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,

    /// Speech-synthesis requests keyed by slot name, answered via `transformed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<BTreeMap<String, TransformEntry>>,

    /// Synthesis results produced by the backend transformers (each entry gains a `url`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformed: Option<BTreeMap<String, TransformEntry>>,

    /// Terminate the interactive session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_session: Option<bool>,

    /// Open the microphone without ending the session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<bool>,

    /// Opaque player save data, written through to durable storage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_data: Option<Value>,

    /// Product id the client wants to start a purchase flow for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_purchase: Option<String>,

    /// Voice-intent passthrough (spoofed or test-injected intents)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    /// Slot candidates accompanying a passthrough intent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<BTreeMap<String, Vec<String>>>,

    /// Text smuggled through the platform's text-to-hint transformation,
    /// used by the client to discover the active wake word
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    /// A full voice-platform request forwarded to the client verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,

    /// Unrecognized keys, carried through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One named speech-synthesis request or result.
///
/// The client queues these under `transform`; the backend registers a
/// synthesis transformer per entry and the client receives them back under
/// `transformed` with `url` filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformEntry {
    /// Text to synthesize
    pub text: String,

    /// Opaque marker echoed on the speech-started / speech-ended events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,

    /// Open the microphone once this speech finishes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<bool>,

    /// Where the synthesized audio can be fetched, set by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Message {
    /// True when no channel is populated.
    pub fn is_empty(&self) -> bool {
        *self == Message::default()
    }

    /// Merge a fragment into this message.
    ///
    /// Every key a fragment carries overwrites the corresponding pending key
    /// (last write wins), except `transform`, which is merged entry-by-entry
    /// so independently queued synthesis requests coexist in one frame.
    pub fn merge_fragment(&mut self, frag: Message) {
        if frag.time.is_some() {
            self.time = frag.time;
        }
        if frag.speech.is_some() {
            self.speech = frag.speech;
        }
        if let Some(entries) = frag.transform {
            self.transform
                .get_or_insert_with(BTreeMap::new)
                .extend(entries);
        }
        if frag.transformed.is_some() {
            self.transformed = frag.transformed;
        }
        if frag.end_session.is_some() {
            self.end_session = frag.end_session;
        }
        if frag.prompt.is_some() {
            self.prompt = frag.prompt;
        }
        if frag.persistent_data.is_some() {
            self.persistent_data = frag.persistent_data;
        }
        if frag.start_purchase.is_some() {
            self.start_purchase = frag.start_purchase;
        }
        if frag.intent.is_some() {
            self.intent = frag.intent;
        }
        if frag.slots.is_some() {
            self.slots = frag.slots;
        }
        if frag.hint.is_some() {
            self.hint = frag.hint;
        }
        if frag.request.is_some() {
            self.request = frag.request;
        }
        self.extra.extend(frag.extra);
    }
}
