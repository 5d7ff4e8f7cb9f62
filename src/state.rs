use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::{gemini_tts, VoiceOptions, SYNTHESIS_SAMPLE_RATE};
use crate::speech::{RetryPolicy, SpeechClient, DEFAULT_BACKOFF, DEFAULT_MAX_RETRIES};
use crate::viewer::LessonViewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Idle,
    Synthesizing,
    Playing,
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::Idle
    }
}

pub struct AppState {
    pub viewer: Mutex<LessonViewer>,
    pub speech: Arc<SpeechClient>,
    pub status: Mutex<AppStatus>,
    pub settings: Mutex<Settings>,
}

impl AppState {
    pub fn new(viewer: LessonViewer, speech: Arc<SpeechClient>, settings: Settings) -> Self {
        Self {
            viewer: Mutex::new(viewer),
            speech,
            status: Mutex::new(AppStatus::default()),
            settings: Mutex::new(settings),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub speech: SpeechSettings,
    #[serde(default)]
    pub general: GeneralSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub model: String,
    pub voice: String,
    pub base_url: String,
    /// Output context rate. Synthesized speech is 24 kHz regardless and is
    /// resampled to the device.
    pub sample_rate: u32,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub request_timeout_s: u64,
}

impl SpeechSettings {
    pub fn voice_options(&self) -> VoiceOptions {
        VoiceOptions {
            model: self.model.clone(),
            voice: self.voice.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff_unit: Duration::from_millis(self.backoff_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s.max(1))
    }
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            model: gemini_tts::DEFAULT_MODEL.to_string(),
            voice: gemini_tts::DEFAULT_VOICE.to_string(),
            base_url: gemini_tts::DEFAULT_BASE_URL.to_string(),
            sample_rate: SYNTHESIS_SAMPLE_RATE,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_ms: DEFAULT_BACKOFF.as_millis() as u64,
            request_timeout_s: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Lesson id to open at startup; the first lesson when unset.
    pub start_lesson: Option<u32>,
    /// How long the audio trigger stays disabled after a request finishes.
    pub trigger_cooldown_ms: u64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            start_lesson: None,
            trigger_cooldown_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"speech":{"voice":"Puck","max_retries":3}}"#).unwrap();
        assert_eq!(settings.speech.voice, "Puck");
        assert_eq!(settings.speech.max_retries, 3);
        assert_eq!(settings.speech.model, gemini_tts::DEFAULT_MODEL);
        assert_eq!(settings.speech.sample_rate, 24_000);
        assert_eq!(settings.general, GeneralSettings::default());
    }

    #[test]
    fn retry_policy_from_settings() {
        let speech = SpeechSettings {
            max_retries: 4,
            backoff_ms: 250,
            ..SpeechSettings::default()
        };
        let policy = speech.retry_policy();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.delay_for(2), Duration::from_millis(500));
    }
}
