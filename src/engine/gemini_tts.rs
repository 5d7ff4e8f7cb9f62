use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use super::{SpeechError, SpeechSynthesizer, SynthesizedAudio, VoiceOptions};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE: &str = "Kore";

/// Gemini `generateContent` client configured for audio output.
pub struct GeminiTtsEngine {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    options: VoiceOptions,
}

impl GeminiTtsEngine {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        options: VoiceOptions,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("FluentEnglish/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            options,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.options.model)
    }

    async fn request(&self, text: &str) -> Result<SynthesizedAudio, SpeechError> {
        let api_key = self.api_key.as_deref().ok_or(SpeechError::MissingApiKey)?;
        let body = GenerateRequest::audio(text, &self.options.voice);

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &raw));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| SpeechError::Network(e.to_string()))?;

        parsed.first_audio().ok_or(SpeechError::EmptyAudio)
    }
}

impl SpeechSynthesizer for GeminiTtsEngine {
    fn synthesize<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<SynthesizedAudio, SpeechError>> {
        Box::pin(self.request(text))
    }
}

fn api_error(status: u16, raw: &str) -> SpeechError {
    match serde_json::from_str::<ErrorEnvelope>(raw) {
        Ok(envelope) => SpeechError::Api {
            status,
            code: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => SpeechError::Api {
            status,
            code: String::new(),
            message: raw.trim().to_string(),
        },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

impl GenerateRequest {
    fn audio(text: &str, voice: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(text.to_string()),
                    inline_data: None,
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                },
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Only the first part of the first candidate is considered, a text-only
    /// fallback there counts as no audio.
    fn first_audio(self) -> Option<SynthesizedAudio> {
        let part = self.candidates.into_iter().next()?.content?.parts.into_iter().next()?;
        let data = part.inline_data?.data;
        if data.is_empty() {
            return None;
        }
        Some(SynthesizedAudio { base64_pcm: data })
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}
