use anyhow::{Context, Result};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::warn;

/// Decoded synthesized speech, ready for playback.
#[derive(Debug, Clone)]
pub struct SpeechBuffer {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

impl SpeechBuffer {
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }
}

/// The single reusable speech resource.
///
/// Every new speech event overwrites whatever is loaded; overlapping speech
/// is not supported, a new buffer replaces the one currently playing.
#[derive(Debug, Default)]
pub struct SpeechSlot {
    current: Option<SpeechBuffer>,
}

impl SpeechSlot {
    /// Swap in a freshly decoded buffer, returning the displaced one.
    pub fn swap(&mut self, buffer: SpeechBuffer) -> Option<SpeechBuffer> {
        self.current.replace(buffer)
    }

    pub fn current(&self) -> Option<&SpeechBuffer> {
        self.current.as_ref()
    }
}

/// Fetches the synthesized audio asset a `transformed` entry points at.
#[async_trait::async_trait]
pub trait SpeechFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Plays a decoded speech buffer.
///
/// `play` resolves when playback finishes, which is what drives the
/// speech-ended event.
#[async_trait::async_trait]
pub trait SpeechSink: Send + Sync {
    async fn play(&self, buffer: SpeechBuffer) -> Result<()>;
}

/// Decode a fetched speech payload into an interleaved PCM buffer.
///
/// The platform serves MP3; the probe is format-driven so test fixtures can
/// be plain WAV.
pub fn decode_speech(bytes: Vec<u8>) -> Result<SpeechBuffer> {
    let stream = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    hint.mime_type("audio/mpeg");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Unrecognized speech audio container")?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .context("No audio track in speech payload")?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Unsupported speech codec")?;

    let mut samples = Vec::new();
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e).context("Failed to read speech packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                // skip the bad packet, the stream may still recover
                warn!("Dropping undecodable speech packet: {}", e);
                continue;
            }
            Err(e) => return Err(e).context("Failed to decode speech packet"),
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        channels = spec.channels.count() as u16;

        let mut buffer = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    if samples.is_empty() {
        anyhow::bail!("Speech payload decoded to no audio");
    }

    Ok(SpeechBuffer {
        samples,
        sample_rate,
        channels,
    })
}
