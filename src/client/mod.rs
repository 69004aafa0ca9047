//! Game-client half of the bridge
//!
//! This module hosts the voice platform inside the game: it accumulates
//! outbound event fragments into rate-limited batched frames, routes
//! inbound frames to typed events, keeps the player's save data with
//! dirty tracking, and owns the reusable speech playback slot.

mod events;
mod outbox;
mod router;
mod speech;

pub use events::{ClientEvent, EventBus};
pub use outbox::{Outbox, PersistentData, MIN_SEND_INTERVAL_MS};
pub use router::InboundRouter;
pub use speech::{decode_speech, SpeechBuffer, SpeechFetcher, SpeechSink, SpeechSlot};

use crate::channel::{DeliveryStatus, MessageChannel};
use crate::nlu;
use crate::protocol::{Message, TransformEntry};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Wake words the fuzzy matcher recognizes.
pub const WAKE_WORD_VOCABULARY: &[&str] = &["alexa", "echo", "computer", "amazon", "ziggy"];

const DEFAULT_WAKE_WORD: &str = "alexa";

/// One page/connection session of the game client.
///
/// Owns all per-session state the handlers need: the event bus, the
/// outbound accumulator, save data, and the discovered wake word. Handlers
/// receive it by reference; there are no ambient globals.
pub struct ClientHost {
    channel: Arc<dyn MessageChannel>,
    router: InboundRouter,
    bus: EventBus,
    outbox: Outbox,
    persistence: PersistentData,
    wake_word: String,
}

impl ClientHost {
    pub fn new(
        channel: Arc<dyn MessageChannel>,
        fetcher: Arc<dyn SpeechFetcher>,
        sink: Arc<dyn SpeechSink>,
    ) -> Self {
        let bus = EventBus::new();
        let router = InboundRouter::new(bus.clone(), fetcher, sink);

        Self {
            channel,
            router,
            bus,
            outbox: Outbox::new(),
            persistence: PersistentData::default(),
            wake_word: DEFAULT_WAKE_WORD.to_string(),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn wake_word(&self) -> &str {
        &self.wake_word
    }

    pub fn persistence(&self) -> &PersistentData {
        &self.persistence
    }

    /// Mutable save data; callers must mark it dirty or the change is lost.
    pub fn persistence_mut(&mut self) -> &mut PersistentData {
        &mut self.persistence
    }

    /// Complete the connect handshake with the start-up message the
    /// backend packed into the launch directive.
    ///
    /// Adopts the cloud copy of the save data and recovers the device's
    /// wake word from the transformed hint. A missing start-up message is
    /// logged and tolerated; the session continues with local defaults.
    pub fn connect(&mut self, startup: Option<Message>) {
        let msg = match startup {
            Some(msg) => msg,
            None => {
                warn!(
                    "Connected without start-up data; \
                     the endpoint may not be packing the launch directive"
                );
                let mut msg = Message::default();
                msg.persistent_data = Some(self.persistence.get().clone());
                self.bus.emit(ClientEvent::Connected(msg));
                return;
            }
        };

        if let Some(data) = &msg.persistent_data {
            self.persistence.replace(data.clone());
            self.bus.emit(ClientEvent::PersistenceUpdated(data.clone()));
        }

        if let Some(hint) = &msg.hint {
            match wake_word_from_hint(hint) {
                Some(word) => {
                    if nlu::closest_match(&word, WAKE_WORD_VOCABULARY, 0.5).is_none() {
                        warn!("Wake word {:?} is not in the known vocabulary", word);
                    }
                    info!("Discovered wake word: {}", word);
                    self.wake_word = word;
                }
                None => {
                    warn!("Could not read a wake word from hint {:?}", hint);
                }
            }
        }

        self.bus.emit(ClientEvent::Connected(msg));
    }

    /// Route one inbound message from the hosting layer.
    pub async fn receive(&self, msg: Message) {
        self.router.route(msg).await;
    }

    /// The slot holding the most recently decoded speech buffer.
    pub fn speech_slot(&self) -> Arc<tokio::sync::Mutex<SpeechSlot>> {
        self.router.speech_slot()
    }

    // ------------------------------------------------------------------
    // Outbound triggers; each queues a fragment for the next flush
    // ------------------------------------------------------------------

    /// Open the microphone without speaking.
    pub fn open_mic(&mut self) {
        let mut frag = Message::default();
        frag.prompt = Some(true);
        self.send_raw(frag);
    }

    /// Ask for speech synthesized for in-game playback.
    pub fn speak(&mut self, text: impl Into<String>, marker: Option<String>) {
        self.queue_transform_speech(text.into(), marker, None);
    }

    /// Like [`Self::speak`], but opens the microphone when playback ends.
    pub fn prompt(&mut self, text: impl Into<String>, marker: Option<String>) {
        self.queue_transform_speech(text.into(), marker, Some(true));
    }

    /// Quit the session with a parting message spoken natively; the client
    /// will already be torn down when it plays.
    pub fn quit(&mut self, text: impl Into<String>) {
        let mut frag = Message::default();
        frag.speech = Some(text.into());
        frag.end_session = Some(true);
        self.send_raw(frag);
    }

    /// Begin the two-turn purchase confirmation handshake.
    pub fn start_purchase(&mut self, product_id: impl Into<String>) {
        let mut frag = Message::default();
        frag.start_purchase = Some(product_id.into());
        self.send_raw(frag);
    }

    /// Queue an arbitrary fragment.
    pub fn send_raw(&mut self, frag: Message) {
        self.outbox.queue_fragment(frag);
    }

    fn queue_transform_speech(&mut self, text: String, marker: Option<String>, prompt: Option<bool>) {
        let mut entries = BTreeMap::new();
        entries.insert(
            "speech".to_string(),
            TransformEntry {
                text,
                marker,
                prompt,
                url: None,
            },
        );

        let mut frag = Message::default();
        frag.transform = Some(entries);
        self.send_raw(frag);
    }

    /// Per-tick update: flush the outbox if due and send fire-and-forget.
    ///
    /// A non-success delivery status is logged, never retried; the next
    /// natural flush carries fresh state regardless.
    pub fn update(&mut self, now_ms: u64) {
        if let Some(msg) = self.outbox.flush_if_due(now_ms, &mut self.persistence) {
            let channel = Arc::clone(&self.channel);
            tokio::spawn(async move {
                match channel.send(msg).await {
                    Ok(DeliveryStatus::Delivered) => {}
                    Ok(DeliveryStatus::Rejected { status }) => {
                        warn!("Skill backend rejected message, status {}", status);
                    }
                    Err(e) => {
                        warn!("Failed to send message to skill backend: {:#}", e);
                    }
                }
            });
        }
    }
}

/// Recover the wake word from a transformed hint string.
///
/// The backend seeds the launch directive with a hint that the platform's
/// text-to-hint transformer rewrites into something like
/// `Try "Alexa, hello"`; the word between the opening quote and the comma
/// is the active wake word.
pub fn wake_word_from_hint(hint: &str) -> Option<String> {
    let at = hint
        .as_bytes()
        .windows(3)
        .position(|w| w.eq_ignore_ascii_case(b"try"))?;
    let rest = hint[at + 3..].trim_start();
    let rest = rest.strip_prefix('"')?;

    let word: String = rest
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    if word.is_empty() || !rest[word.len()..].starts_with(',') {
        return None;
    }

    Some(word)
}
