use anyhow::Result;
use serde_json::json;
use skill_bridge::channel::{DeliveryStatus, MessageChannel};
use skill_bridge::client::{
    wake_word_from_hint, ClientEvent, ClientHost, SpeechBuffer, SpeechFetcher, SpeechSink,
};
use skill_bridge::protocol::Message;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Records everything sent through it.
struct RecordingChannel {
    sent: Mutex<Vec<Message>>,
}

impl RecordingChannel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait::async_trait]
impl MessageChannel for RecordingChannel {
    async fn send(&self, msg: Message) -> Result<DeliveryStatus> {
        self.sent.lock().await.push(msg);
        Ok(DeliveryStatus::Delivered)
    }
}

struct NoFetch;

#[async_trait::async_trait]
impl SpeechFetcher for NoFetch {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        anyhow::bail!("not available in tests")
    }
}

struct NoSink;

#[async_trait::async_trait]
impl SpeechSink for NoSink {
    async fn play(&self, _buffer: SpeechBuffer) -> Result<()> {
        Ok(())
    }
}

fn host(channel: Arc<RecordingChannel>) -> ClientHost {
    ClientHost::new(channel, Arc::new(NoFetch), Arc::new(NoSink))
}

#[test]
fn test_wake_word_from_hint() {
    assert_eq!(
        wake_word_from_hint(r#"Try "Alexa, hello""#).as_deref(),
        Some("Alexa")
    );
    assert_eq!(
        wake_word_from_hint(r#"try "Computer, play again""#).as_deref(),
        Some("Computer")
    );
    assert_eq!(wake_word_from_hint("no hint here"), None);
    assert_eq!(wake_word_from_hint(r#"Try "Alexa hello""#), None);
}

#[tokio::test]
async fn test_connect_adopts_cloud_state() {
    let channel = RecordingChannel::new();
    let mut host = host(channel);
    let mut rx = host.events().subscribe();

    let mut startup = Message::default();
    startup.persistent_data = Some(json!({"coins": 42}));
    startup.hint = Some(r#"Try "Echo, hello""#.to_string());
    host.connect(Some(startup));

    assert_eq!(host.wake_word(), "Echo");
    assert_eq!(host.persistence().get()["coins"], 42);

    match rx.recv().await.unwrap() {
        ClientEvent::PersistenceUpdated(data) => assert_eq!(data["coins"], 42),
        other => panic!("expected persistence event, got {:?}", other),
    }
    match rx.recv().await.unwrap() {
        ClientEvent::Connected(msg) => assert!(msg.persistent_data.is_some()),
        other => panic!("expected connected event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connect_without_startup_data_still_connects() {
    let channel = RecordingChannel::new();
    let mut host = host(channel);
    let mut rx = host.events().subscribe();

    host.connect(None);

    assert_eq!(host.wake_word(), "alexa");
    match rx.recv().await.unwrap() {
        ClientEvent::Connected(msg) => assert!(msg.persistent_data.is_some()),
        other => panic!("expected connected event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_triggers_coalesce_into_one_flush() {
    let channel = RecordingChannel::new();
    let mut host = host(Arc::clone(&channel));

    host.speak("you win", Some("victory".to_string()));
    host.open_mic();
    host.update(5_000);

    tokio::time::sleep(Duration::from_millis(100)).await;

    let sent = channel.sent.lock().await;
    assert_eq!(sent.len(), 1);

    let msg = &sent[0];
    assert_eq!(msg.prompt, Some(true));
    let transform = msg.transform.as_ref().unwrap();
    assert_eq!(transform["speech"].text, "you win");
    assert_eq!(transform["speech"].marker.as_deref(), Some("victory"));
}

#[tokio::test]
async fn test_quit_fragment_carries_parting_speech() {
    let channel = RecordingChannel::new();
    let mut host = host(Arc::clone(&channel));

    host.quit("thanks for playing");
    host.update(5_000);

    tokio::time::sleep(Duration::from_millis(100)).await;

    let sent = channel.sent.lock().await;
    assert_eq!(sent[0].speech.as_deref(), Some("thanks for playing"));
    assert_eq!(sent[0].end_session, Some(true));
}

#[tokio::test]
async fn test_dirty_persistence_is_flushed_on_tick() {
    let channel = RecordingChannel::new();
    let mut host = host(Arc::clone(&channel));

    host.persistence_mut().get_mut()["coins"] = json!(7);
    host.persistence_mut().mark_dirty();

    host.update(5_000);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let sent = channel.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].persistent_data.as_ref().unwrap()["coins"], 7);
}

#[tokio::test]
async fn test_flushes_are_rate_limited() {
    let channel = RecordingChannel::new();
    let mut host = host(Arc::clone(&channel));

    host.open_mic();
    host.update(5_000);

    host.open_mic();
    host.update(5_500); // too soon
    host.update(6_001);

    tokio::time::sleep(Duration::from_millis(100)).await;

    let sent = channel.sent.lock().await;
    assert_eq!(sent.len(), 2);
}
