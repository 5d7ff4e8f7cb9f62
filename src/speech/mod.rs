//! Speech playback client.
//!
//! `speak` turns lesson text into audio: sanitize, call the synthesis
//! backend (retrying transient failures with a linear backoff), decode the
//! PCM payload and queue it on the shared output context. Playback is fire
//! and forget; the call returns once the audio has been queued.

pub mod sanitize;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::OnceCell;

use crate::audio::decode_base64_pcm;
use crate::engine::{
    AudioHost, AudioOutput, PcmBuffer, SpeechError, SpeechSynthesizer, SYNTHESIS_CHANNELS,
    SYNTHESIS_SAMPLE_RATE,
};

pub use sanitize::sanitize_for_speech;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(1000);

/// Bounded retry with a linear backoff: the n-th retry waits `n * backoff_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff_unit * retry
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: DEFAULT_BACKOFF,
        }
    }
}

/// Suspends between retries. Swapped out in tests to avoid real timers.
pub trait Delay: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

pub struct TokioDelay;

impl Delay for TokioDelay {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// What a successful `try_speak` queued.
#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    pub text: String,
    pub frames: usize,
    pub duration: Duration,
    pub attempts: u32,
}

pub struct SpeechClient {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    host: Arc<dyn AudioHost>,
    delay: Arc<dyn Delay>,
    retry: RetryPolicy,
    /// Rate the output context is opened at. Synthesized audio is always
    /// decoded at `SYNTHESIS_SAMPLE_RATE` and resampled by the output.
    context_rate: u32,
    /// The process-wide output context: created on first use, then reused.
    /// A failed creation leaves the cell empty so the next call tries again.
    output: OnceCell<Arc<dyn AudioOutput>>,
}

impl SpeechClient {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, host: Arc<dyn AudioHost>) -> Self {
        Self {
            synthesizer,
            host,
            delay: Arc::new(TokioDelay),
            retry: RetryPolicy::default(),
            context_rate: SYNTHESIS_SAMPLE_RATE,
            output: OnceCell::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.context_rate = sample_rate;
        self
    }

    pub fn has_output(&self) -> bool {
        self.output.initialized()
    }

    /// Speak `text`. Returns `true` once audio has been queued; empty input,
    /// abandoned requests and output failures return `false` and are logged.
    pub async fn speak(&self, text: &str) -> bool {
        match self.try_speak(text).await {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(e) => {
                tracing::error!("Speech playback abandoned: {}", e);
                false
            }
        }
    }

    /// Like `speak`, but hands back the error. `Ok(None)` means the text had
    /// nothing speakable in it and no request was made.
    pub async fn try_speak(&self, text: &str) -> Result<Option<Playback>, SpeechError> {
        let clean = sanitize_for_speech(text);
        if clean.is_empty() {
            tracing::debug!("Nothing to speak after sanitizing {:?}", text);
            return Ok(None);
        }

        let output = self.output().await?;
        if output.is_suspended() {
            on_output(&output, |o| o.resume()).await?;
        }

        let (buffer, attempts) = self.fetch_with_retry(&clean).await?;
        let frames = buffer.frame_count();
        let duration = buffer.duration();

        on_output(&output, move |o| o.play(&buffer)).await?;

        tracing::info!(
            "Playing {:.2}s of speech for {:?} (attempt {})",
            duration.as_secs_f64(),
            clean,
            attempts
        );

        Ok(Some(Playback {
            text: clean,
            frames,
            duration,
            attempts,
        }))
    }

    /// Synthesize and decode without touching the output context.
    pub async fn synthesize(&self, text: &str) -> Result<Option<PcmBuffer>, SpeechError> {
        let clean = sanitize_for_speech(text);
        if clean.is_empty() {
            return Ok(None);
        }
        let (buffer, _) = self.fetch_with_retry(&clean).await?;
        Ok(Some(buffer))
    }

    /// Drops whatever is still queued. Returns `false` if nothing was ever played.
    pub fn stop(&self) -> anyhow::Result<bool> {
        match self.output.get() {
            Some(output) => {
                output.stop()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn output(&self) -> Result<Arc<dyn AudioOutput>, SpeechError> {
        let output = self
            .output
            .get_or_try_init(|| async {
                let host = Arc::clone(&self.host);
                let rate = self.context_rate;
                tracing::info!("Creating audio output context at {}Hz", rate);
                tokio::task::spawn_blocking(move || host.create_output(rate))
                    .await
                    .map_err(|e| SpeechError::Output(e.to_string()))?
                    .map(Arc::<dyn AudioOutput>::from)
                    .map_err(|e| SpeechError::Output(format!("{:#}", e)))
            })
            .await?;
        Ok(Arc::clone(output))
    }

    async fn fetch_with_retry(&self, text: &str) -> Result<(PcmBuffer, u32), SpeechError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let result = match self.synthesizer.synthesize(text).await {
                Ok(audio) => decode_base64_pcm(&audio.base64_pcm, SYNTHESIS_SAMPLE_RATE, SYNTHESIS_CHANNELS)
                    .and_then(|buffer| {
                        if buffer.is_empty() {
                            Err(SpeechError::EmptyAudio)
                        } else {
                            Ok(buffer)
                        }
                    }),
                Err(e) => Err(e),
            };

            match result {
                Ok(buffer) => return Ok((buffer, attempt)),
                Err(e) if e.is_transient() && attempt <= self.retry.max_retries => {
                    let wait = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "Speech attempt {}/{} failed: {}. Retrying in {}ms",
                        attempt,
                        self.retry.max_attempts(),
                        e,
                        wait.as_millis()
                    );
                    self.delay.sleep(wait).await;
                }
                Err(e) => {
                    if e.is_transient() {
                        tracing::error!("Speech service still failing after {} attempts", attempt);
                    }
                    return Err(e);
                }
            }
        }
    }
}

/// Runs an output call (device control, resampling) on the blocking pool.
async fn on_output<T, F>(output: &Arc<dyn AudioOutput>, f: F) -> Result<T, SpeechError>
where
    T: Send + 'static,
    F: FnOnce(&dyn AudioOutput) -> anyhow::Result<T> + Send + 'static,
{
    let output = Arc::clone(output);
    tokio::task::spawn_blocking(move || f(output.as_ref()))
        .await
        .map_err(|e| SpeechError::Output(e.to_string()))?
        .map_err(|e| SpeechError::Output(format!("{:#}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.max_attempts(), 3);
    }
}
