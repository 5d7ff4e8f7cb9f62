pub mod gemini_tts;

use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;

/// Sample rate of the PCM returned by the synthesis service.
pub const SYNTHESIS_SAMPLE_RATE: u32 = 24_000;

/// Channel count of the PCM returned by the synthesis service.
pub const SYNTHESIS_CHANNELS: u16 = 1;

/// Decoded audio, channel-major: `channels[c][frame]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl PcmBuffer {
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }
}

/// Voice and model selection for one synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceOptions {
    pub model: String,
    pub voice: String,
}

/// Raw payload handed back by a synthesizer, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub base64_pcm: String,
}

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("synthesis service returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("synthesis request failed: {0}")]
    Network(String),

    #[error("synthesis response contained no audio")]
    EmptyAudio,

    #[error("no API key configured (set GEMINI_API_KEY or pass --api-key)")]
    MissingApiKey,

    #[error("could not decode audio payload: {0}")]
    Decode(String),

    #[error("audio output unavailable: {0}")]
    Output(String),
}

impl SpeechError {
    /// Transient failures are worth another attempt after a backoff.
    pub fn is_transient(&self) -> bool {
        match self {
            SpeechError::Api {
                status,
                code,
                message,
            } => *status == 500 || code == "INTERNAL" || message.contains("INTERNAL"),
            SpeechError::Network(_) | SpeechError::EmptyAudio => true,
            SpeechError::MissingApiKey | SpeechError::Decode(_) | SpeechError::Output(_) => false,
        }
    }
}

/// Remote text-to-speech backend: text in, base64 PCM out.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<SynthesizedAudio, SpeechError>>;
}

/// Opens the process-wide output context.
pub trait AudioHost: Send + Sync {
    fn create_output(&self, sample_rate: u32) -> anyhow::Result<Box<dyn AudioOutput>>;
}

/// A live output context. `play` queues the buffer and returns immediately.
pub trait AudioOutput: Send + Sync {
    fn is_suspended(&self) -> bool;
    fn resume(&self) -> anyhow::Result<()>;
    fn play(&self, buffer: &PcmBuffer) -> anyhow::Result<()>;
    fn stop(&self) -> anyhow::Result<()>;
}
