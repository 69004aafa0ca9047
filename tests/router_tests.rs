use anyhow::Result;
use skill_bridge::client::{
    ClientEvent, EventBus, InboundRouter, SpeechBuffer, SpeechFetcher, SpeechSink,
};
use skill_bridge::protocol::{Message, TransformEntry};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Serves a fixed payload for any url.
struct FixedFetcher {
    bytes: Vec<u8>,
}

#[async_trait::async_trait]
impl SpeechFetcher for FixedFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

struct FailingFetcher;

#[async_trait::async_trait]
impl SpeechFetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        anyhow::bail!("asset {} unavailable", url)
    }
}

/// Completes playback immediately.
struct InstantSink;

#[async_trait::async_trait]
impl SpeechSink for InstantSink {
    async fn play(&self, _buffer: SpeechBuffer) -> Result<()> {
        Ok(())
    }
}

/// A tiny PCM WAV file, enough for the decoder to chew on.
fn wav_bytes(samples: &[i16]) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&16000u32.to_le_bytes());
    bytes.extend_from_slice(&32000u32.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

fn speech_message(marker: Option<&str>) -> Message {
    let mut entries = BTreeMap::new();
    entries.insert(
        "speech".to_string(),
        TransformEntry {
            text: "you win".to_string(),
            marker: marker.map(str::to_string),
            prompt: None,
            url: Some("mem://speech".to_string()),
        },
    );
    let mut msg = Message::default();
    msg.transformed = Some(entries);
    msg
}

async fn next_event(rx: &mut broadcast::Receiver<ClientEvent>) -> ClientEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event bus closed")
}

#[tokio::test]
async fn test_intent_request_is_resolved_and_emitted() {
    let bus = EventBus::new();
    let router = InboundRouter::new(bus.clone(), Arc::new(FailingFetcher), Arc::new(InstantSink));
    let mut rx = bus.subscribe();

    let raw = serde_json::json!({
        "type": "intent",
        "intent": {
            "name": "BuyIntent",
            "slots": {
                "count": {
                    "value": "3",
                    "resolutions": {
                        "resolutionsPerAuthority": [
                            {"values": [{"value": {"name": "three"}}]}
                        ]
                    }
                }
            }
        }
    });

    let mut msg = Message::default();
    msg.request = Some(raw.clone());
    router.route(msg).await;

    match next_event(&mut rx).await {
        ClientEvent::IntentReceived(parsed) => {
            assert_eq!(parsed.name, "BuyIntent");
            assert_eq!(parsed.slots["count"], vec!["3", "three"]);
            // the raw request rides along for anyone who needs it
            assert_eq!(parsed.request, raw);
        }
        other => panic!("expected intent event, got {:?}", other),
    }

    // the generic event always follows the specific ones
    match next_event(&mut rx).await {
        ClientEvent::MessageReceived(msg) => assert!(msg.request.is_some()),
        other => panic!("expected message event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_extension_keys_reach_message_event() {
    let bus = EventBus::new();
    let router = InboundRouter::new(bus.clone(), Arc::new(FailingFetcher), Arc::new(InstantSink));
    let mut rx = bus.subscribe();

    let msg: Message =
        serde_json::from_str(r#"{"leaderboard": {"rank": 4}}"#).unwrap();
    router.route(msg).await;

    match next_event(&mut rx).await {
        ClientEvent::MessageReceived(msg) => {
            assert_eq!(msg.extra["leaderboard"]["rank"], 4);
        }
        other => panic!("expected message event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_speech_plays_and_fires_marker_events() {
    let bus = EventBus::new();
    let router = InboundRouter::new(
        bus.clone(),
        Arc::new(FixedFetcher {
            bytes: wav_bytes(&[100, -200, 300, -400, 500, -600, 700, -800]),
        }),
        Arc::new(InstantSink),
    );
    let mut rx = bus.subscribe();

    router.route(speech_message(Some("victory"))).await;

    let mut started = false;
    let mut ended = false;
    while !ended {
        match next_event(&mut rx).await {
            ClientEvent::SpeechStarted(marker) => {
                assert_eq!(marker, "victory");
                started = true;
            }
            ClientEvent::SpeechEnded(marker) => {
                assert_eq!(marker, "victory");
                assert!(started, "ended before started");
                ended = true;
            }
            ClientEvent::MessageReceived(_) => {}
            other => panic!("unexpected event {:?}", other),
        }
    }

    // the decoded buffer landed in the reusable slot
    let slot = router.speech_slot();
    let slot = slot.lock().await;
    let buffer = slot.current().expect("slot is empty");
    assert_eq!(buffer.sample_rate, 16000);
    assert_eq!(buffer.channels, 1);
    assert_eq!(buffer.samples.len(), 8);
}

#[tokio::test]
async fn test_speech_without_marker_fires_no_marker_events() {
    let bus = EventBus::new();
    let router = InboundRouter::new(
        bus.clone(),
        Arc::new(FixedFetcher {
            bytes: wav_bytes(&[1, 2, 3, 4]),
        }),
        Arc::new(InstantSink),
    );
    let mut rx = bus.subscribe();

    router.route(speech_message(None)).await;

    match next_event(&mut rx).await {
        ClientEvent::MessageReceived(_) => {}
        other => panic!("expected message event, got {:?}", other),
    }

    // give the playback task time to (not) emit
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(matches!(
        rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_failed_speech_fetch_does_not_disturb_routing() {
    let bus = EventBus::new();
    let router = InboundRouter::new(bus.clone(), Arc::new(FailingFetcher), Arc::new(InstantSink));
    let mut rx = bus.subscribe();

    router.route(speech_message(Some("victory"))).await;

    // routing still completes and the generic event still fires
    match next_event(&mut rx).await {
        ClientEvent::MessageReceived(_) => {}
        other => panic!("expected message event, got {:?}", other),
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(matches!(
        rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}

#[tokio::test]
async fn test_undecodable_speech_is_dropped() {
    let bus = EventBus::new();
    let router = InboundRouter::new(
        bus.clone(),
        Arc::new(FixedFetcher {
            bytes: vec![0xde, 0xad, 0xbe, 0xef],
        }),
        Arc::new(InstantSink),
    );
    let mut rx = bus.subscribe();

    router.route(speech_message(Some("victory"))).await;

    match next_event(&mut rx).await {
        ClientEvent::MessageReceived(_) => {}
        other => panic!("expected message event, got {:?}", other),
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(matches!(
        rx.try_recv(),
        Err(broadcast::error::TryRecvError::Empty)
    ));
}
