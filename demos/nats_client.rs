use anyhow::Result;
use futures::StreamExt;
use skill_bridge::channel::{MessageChannel, NatsChannel};
use skill_bridge::client::{ClientHost, SpeechBuffer, SpeechFetcher, SpeechSink};
use skill_bridge::protocol::Message;
use skill_bridge::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

/// Resolves speech urls against the local filesystem.
struct FileFetcher;

#[async_trait::async_trait]
impl SpeechFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        Ok(tokio::fs::read(path).await?)
    }
}

/// Pretends to play by sleeping for the buffer's duration.
struct ConsoleSink;

#[async_trait::async_trait]
impl SpeechSink for ConsoleSink {
    async fn play(&self, buffer: SpeechBuffer) -> Result<()> {
        info!("🔊 Playing {:.1}s of speech", buffer.duration_seconds());
        sleep(Duration::from_secs_f64(buffer.duration_seconds())).await;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("🧪 Testing the NATS message channel");

    let cfg = Config::load("config/skill-bridge")?;

    // 1. Connect to NATS and take the client side of the subject pair
    let channel = Arc::new(
        NatsChannel::connect(&cfg.channel.nats_url, "demo-session".to_string()).await?,
    );
    info!("✅ Connected to NATS");

    let mut inbound = channel.subscribe_inbound().await?;
    info!("✅ Subscribed to inbound frames");

    // 2. Stand up a client host on top of the channel
    let mut host = ClientHost::new(
        Arc::clone(&channel) as Arc<dyn MessageChannel>,
        Arc::new(FileFetcher),
        Arc::new(ConsoleSink),
    );

    let mut events = host.events().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("📨 Event: {:?}", event);
        }
    });

    // 3. Fake the connect handshake a real device would deliver
    let mut startup = Message::default();
    startup.hint = Some(format!("Try \"alexa, {}\"", cfg.skill.hint));
    host.connect(Some(startup));
    info!("✅ Connected, wake word is {:?}", host.wake_word());

    // 4. Queue some outbound traffic and tick until it flushes
    host.prompt("hello from the demo client", Some("demo".to_string()));

    // 5. Loop a synthetic backend frame through the outbox subject so
    //    there is inbound traffic even without a backend running
    let mut echo = Message::default();
    echo.speech = Some("round trip".to_string());
    channel.publish_outbound(&echo).await?;

    for _ in 0..20 {
        let now_ms = chrono::Utc::now().timestamp_millis() as u64;
        host.update(now_ms);

        // feed anything the skill backend pushed back into the router
        match tokio::time::timeout(Duration::from_millis(500), inbound.next()).await {
            Ok(Some(frame)) => match serde_json::from_slice::<Message>(&frame.payload) {
                Ok(msg) => host.receive(msg).await,
                Err(e) => eprintln!("Failed to parse inbound frame: {}", e),
            },
            Ok(None) => break, // Subscription closed
            Err(_) => {} // Timeout - nothing inbound yet
        }
    }

    info!("✅ Demo complete");

    Ok(())
}
