use skill_bridge::protocol::{
    Directive, Message, Request, RequestEnvelope, SkillResponse, TransformEntry,
};
use std::collections::BTreeMap;

#[test]
fn test_message_uses_camel_case_keys() {
    let json = r#"{
        "speech": "goodbye",
        "endSession": true,
        "startPurchase": "sword-pack",
        "persistentData": {"coins": 12}
    }"#;

    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.speech.as_deref(), Some("goodbye"));
    assert_eq!(msg.end_session, Some(true));
    assert_eq!(msg.start_purchase.as_deref(), Some("sword-pack"));
    assert_eq!(msg.persistent_data.unwrap()["coins"], 12);

    let mut out = Message::default();
    out.end_session = Some(true);
    let serialized = serde_json::to_string(&out).unwrap();
    assert!(serialized.contains("\"endSession\":true"));
    // absent channels are omitted entirely
    assert!(!serialized.contains("speech"));
}

#[test]
fn test_unrecognized_keys_are_preserved() {
    let json = r#"{"speech": "hi", "leaderboard": {"rank": 4}}"#;

    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg.extra["leaderboard"]["rank"], 4);

    let round_trip = serde_json::to_string(&msg).unwrap();
    assert!(round_trip.contains("leaderboard"));
}

#[test]
fn test_merge_fragment_last_write_wins() {
    let mut pending = Message::default();

    let mut a = Message::default();
    a.speech = Some("first".to_string());
    a.prompt = Some(true);
    pending.merge_fragment(a);

    let mut b = Message::default();
    b.speech = Some("second".to_string());
    pending.merge_fragment(b);

    assert_eq!(pending.speech.as_deref(), Some("second"));
    assert_eq!(pending.prompt, Some(true));
}

#[test]
fn test_merge_fragment_merges_transform_by_sub_key() {
    let mut pending = Message::default();

    let mut a = Message::default();
    let mut entries = BTreeMap::new();
    entries.insert(
        "speech".to_string(),
        TransformEntry {
            text: "hello there".to_string(),
            ..Default::default()
        },
    );
    a.transform = Some(entries);
    pending.merge_fragment(a);

    let mut b = Message::default();
    let mut entries = BTreeMap::new();
    entries.insert(
        "narrator".to_string(),
        TransformEntry {
            text: "a new challenger".to_string(),
            ..Default::default()
        },
    );
    b.transform = Some(entries);
    pending.merge_fragment(b);

    let transform = pending.transform.unwrap();
    assert_eq!(transform.len(), 2);
    assert_eq!(transform["speech"].text, "hello there");
    assert_eq!(transform["narrator"].text, "a new challenger");
}

#[test]
fn test_envelope_deserialization() {
    let json = r#"{
        "sessionId": "session-1",
        "playerId": "player-9",
        "locale": "en-US",
        "device": {"html": true, "wakeWord": true},
        "timestamp": 1700000000000,
        "request": {
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
        }
    }"#;

    let envelope: RequestEnvelope = serde_json::from_str(json).unwrap();
    assert_eq!(envelope.session_id, "session-1");
    assert!(envelope.device.html);
    assert_eq!(envelope.timestamp, Some(1_700_000_000_000));

    match envelope.request {
        Request::Intent(req) => {
            assert_eq!(req.intent.name, "BuyIntent");
            let slot = &req.intent.slots["count"];
            assert_eq!(slot.value.as_deref(), Some("3"));
        }
        other => panic!("expected intent request, got {:?}", other),
    }
}

#[test]
fn test_directive_wire_tags() {
    let directive = Directive::ConnectionRequest(
        skill_bridge::protocol::ConnectionRequest::buy("sword-pack".to_string()),
    );

    let json = serde_json::to_string(&directive).unwrap();
    assert!(json.contains("\"type\":\"connectionRequest\""));
    assert!(json.contains("\"name\":\"Buy\""));
    assert!(json.contains("\"productId\":\"sword-pack\""));
    // every connection request gets its own correlation token
    assert!(json.contains("\"token\""));
}

#[test]
fn test_response_omits_unspecified_continuation() {
    let response = SkillResponse::empty();
    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("shouldEndSession"));

    let mut response = SkillResponse::empty();
    response.should_end_session = Some(false);
    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"shouldEndSession\":false"));
}
