use crate::nlu::ParsedIntent;
use crate::protocol::Message;
use serde_json::Value;
use tokio::sync::broadcast;

/// Events the client host publishes to game logic.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The channel handshake completed; carries the start-up message
    Connected(Message),

    /// A voice intent arrived, normalized into ranked slot candidates
    IntentReceived(ParsedIntent),

    /// Any inbound message, raw, fired after the specific events so
    /// forward-compatible extension keys still reach application logic
    MessageReceived(Message),

    /// The player's save data was replaced from the cloud
    PersistenceUpdated(Value),

    /// Synthesized speech with the given marker started playing
    SpeechStarted(String),

    /// Synthesized speech with the given marker finished playing
    SpeechEnded(String),
}

/// Fan-out bus for [`ClientEvent`].
///
/// Publishing is fire-and-forget: any number of listeners, no return value,
/// and no error when nobody is listening.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: ClientEvent) {
        // a send error only means there are no subscribers right now
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
