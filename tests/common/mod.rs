#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use futures_util::future::BoxFuture;

use fluent_english_lib::engine::{
    AudioHost, AudioOutput, PcmBuffer, SpeechError, SpeechSynthesizer, SynthesizedAudio,
};
use fluent_english_lib::speech::{Delay, RetryPolicy, SpeechClient};

pub fn pcm_payload(values: &[i16]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    general_purpose::STANDARD.encode(bytes)
}

pub fn audio(values: &[i16]) -> Result<SynthesizedAudio, SpeechError> {
    Ok(SynthesizedAudio {
        base64_pcm: pcm_payload(values),
    })
}

pub fn internal_error() -> Result<SynthesizedAudio, SpeechError> {
    Err(SpeechError::Api {
        status: 500,
        code: "INTERNAL".into(),
        message: "An internal error has occurred.".into(),
    })
}

pub fn auth_error() -> Result<SynthesizedAudio, SpeechError> {
    Err(SpeechError::Api {
        status: 401,
        code: "UNAUTHENTICATED".into(),
        message: "API key not valid.".into(),
    })
}

/// Replays queued results; once the script runs out every call is an
/// internal server error.
#[derive(Default)]
pub struct ScriptedSynthesizer {
    script: Mutex<VecDeque<Result<SynthesizedAudio, SpeechError>>>,
    texts: Mutex<Vec<String>>,
}

impl ScriptedSynthesizer {
    pub fn new(script: Vec<Result<SynthesizedAudio, SpeechError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.texts.lock().unwrap().len()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for ScriptedSynthesizer {
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<SynthesizedAudio, SpeechError>> {
        self.texts.lock().unwrap().push(text.to_string());
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(internal_error);
        Box::pin(async move { next })
    }
}

#[derive(Default)]
pub struct RecordingDelay {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Delay for RecordingDelay {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.delays.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}

/// Everything the fake output context saw, shared across the outputs a
/// `FakeHost` hands out.
#[derive(Default)]
pub struct OutputLog {
    pub created: AtomicUsize,
    pub resumed: AtomicUsize,
    pub stopped: AtomicUsize,
    pub played: Mutex<Vec<PcmBuffer>>,
    pub context_rates: Mutex<Vec<u32>>,
    pub fail_next_create: AtomicBool,
    pub fail_next_resume: AtomicBool,
}

impl OutputLog {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn resumed(&self) -> usize {
        self.resumed.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn played(&self) -> Vec<PcmBuffer> {
        self.played.lock().unwrap().clone()
    }

    pub fn context_rates(&self) -> Vec<u32> {
        self.context_rates.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub log: Arc<OutputLog>,
}

impl AudioHost for FakeHost {
    fn create_output(&self, sample_rate: u32) -> anyhow::Result<Box<dyn AudioOutput>> {
        if self.log.fail_next_create.swap(false, Ordering::SeqCst) {
            anyhow::bail!("No output device available");
        }
        self.log.context_rates.lock().unwrap().push(sample_rate);
        self.log.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeOutput {
            log: Arc::clone(&self.log),
            suspended: AtomicBool::new(true),
        }))
    }
}

pub struct FakeOutput {
    log: Arc<OutputLog>,
    suspended: AtomicBool,
}

impl AudioOutput for FakeOutput {
    fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    fn resume(&self) -> anyhow::Result<()> {
        if self.log.fail_next_resume.swap(false, Ordering::SeqCst) {
            anyhow::bail!("stream refused to start");
        }
        self.suspended.store(false, Ordering::SeqCst);
        self.log.resumed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn play(&self, buffer: &PcmBuffer) -> anyhow::Result<()> {
        self.log.played.lock().unwrap().push(buffer.clone());
        Ok(())
    }

    fn stop(&self) -> anyhow::Result<()> {
        self.log.stopped.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct Harness {
    pub client: SpeechClient,
    pub synth: Arc<ScriptedSynthesizer>,
    pub delay: Arc<RecordingDelay>,
    pub output: Arc<OutputLog>,
}

pub fn harness(script: Vec<Result<SynthesizedAudio, SpeechError>>) -> Harness {
    let synth = Arc::new(ScriptedSynthesizer::new(script));
    let delay = Arc::new(RecordingDelay::default());
    let host = FakeHost::default();
    let output = Arc::clone(&host.log);

    let client = SpeechClient::new(synth.clone(), Arc::new(host))
        .with_retry(RetryPolicy {
            max_retries: 2,
            backoff_unit: Duration::from_millis(1000),
        })
        .with_delay(delay.clone());

    Harness {
        client,
        synth,
        delay,
        output,
    }
}
