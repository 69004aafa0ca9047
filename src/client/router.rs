use super::events::{ClientEvent, EventBus};
use super::speech::{decode_speech, SpeechFetcher, SpeechSink, SpeechSlot};
use crate::nlu;
use crate::protocol::{Message, Request, TransformEntry};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Dispatches inbound messages to internal events.
///
/// Routing inspects each recognized key independently; a frame may carry an
/// intent, synthesized speech, and extension keys all at once, and every
/// present key is processed. The raw message is always re-emitted last so
/// unrecognized keys reach application logic too.
pub struct InboundRouter {
    bus: EventBus,
    fetcher: Arc<dyn SpeechFetcher>,
    sink: Arc<dyn SpeechSink>,
    speech_slot: Arc<Mutex<SpeechSlot>>,
}

impl InboundRouter {
    pub fn new(bus: EventBus, fetcher: Arc<dyn SpeechFetcher>, sink: Arc<dyn SpeechSink>) -> Self {
        Self {
            bus,
            fetcher,
            sink,
            speech_slot: Arc::new(Mutex::new(SpeechSlot::default())),
        }
    }

    /// The slot holding the most recently decoded speech buffer.
    pub fn speech_slot(&self) -> Arc<Mutex<SpeechSlot>> {
        Arc::clone(&self.speech_slot)
    }

    /// Route one inbound message.
    ///
    /// Speech fetch or decode failures are logged and dropped; they never
    /// disturb the rest of routing.
    pub async fn route(&self, msg: Message) {
        if let Some(raw) = &msg.request {
            match serde_json::from_value::<Request>(raw.clone()) {
                Ok(Request::Intent(intent_request)) => {
                    let parsed = nlu::resolve_intent(&intent_request, raw.clone());
                    info!("Intent received: {}", parsed.name);
                    self.bus.emit(ClientEvent::IntentReceived(parsed));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Ignoring unparseable forwarded request: {}", e);
                }
            }
        }

        if let Some(transformed) = &msg.transformed {
            if let Some(speech) = transformed.get("speech") {
                self.spawn_speech_playback(speech.clone());
            }
        }

        self.bus.emit(ClientEvent::MessageReceived(msg));
    }

    /// Fetch, decode, and play one synthesized speech entry off-thread.
    fn spawn_speech_playback(&self, entry: TransformEntry) {
        let bus = self.bus.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let sink = Arc::clone(&self.sink);
        let slot = Arc::clone(&self.speech_slot);

        tokio::spawn(async move {
            if let Err(e) = play_speech(&bus, fetcher, sink, slot, entry).await {
                warn!("Failed to play synthesized speech: {:#}", e);
            }
        });
    }
}

async fn play_speech(
    bus: &EventBus,
    fetcher: Arc<dyn SpeechFetcher>,
    sink: Arc<dyn SpeechSink>,
    slot: Arc<Mutex<SpeechSlot>>,
    entry: TransformEntry,
) -> Result<()> {
    let url = entry
        .url
        .as_deref()
        .context("Transformed speech entry has no url")?;

    let bytes = fetcher
        .fetch(url)
        .await
        .with_context(|| format!("Failed to fetch speech asset {}", url))?;

    let buffer = decode_speech(bytes).context("Failed to decode speech asset")?;

    // the slot is overwritten on every new speech event; whatever was
    // playing is simply replaced
    {
        let mut slot = slot.lock().await;
        slot.swap(buffer.clone());
    }

    if let Some(marker) = &entry.marker {
        bus.emit(ClientEvent::SpeechStarted(marker.clone()));
    }

    sink.play(buffer).await.context("Speech playback failed")?;

    if let Some(marker) = entry.marker {
        bus.emit(ClientEvent::SpeechEnded(marker));
    }

    Ok(())
}
