//! Google Cloud Text-to-Speech client
//!
//! https://cloud.google.com/text-to-speech/docs/reference/rest/v1/text/synthesize

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use arcana_schema::{Locale, VoiceGender};

use crate::{voice_for, SpeechSynthesizer, SynthesizedAudio};

pub const TTS_API_BASE: &str = "https://texttospeech.googleapis.com";

#[derive(Debug, Clone)]
pub struct GoogleSpeechSynthesizer {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl GoogleSpeechSynthesizer {
    pub fn new(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env(api_base: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("ARCANA_TTS_API_KEY")
            .map_err(|_| anyhow!("ARCANA_TTS_API_KEY is not set"))?;
        Ok(Self::new(api_key, api_base))
    }

    async fn try_synthesize(
        &self,
        ssml: &str,
        locale: Locale,
        gender: VoiceGender,
    ) -> Result<SynthesizedAudio> {
        let voice = voice_for(locale);
        let url = format!("{}/v1/text:synthesize?key={}", self.api_base, self.api_key);
        let payload = SynthesizeRequest {
            input: SynthesisInput { ssml: ssml.into() },
            voice: VoiceSelectionParams {
                language_code: voice.language_code.into(),
                name: voice.name.into(),
                ssml_gender: gender.as_str().into(),
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3".into(),
            },
        };

        let resp = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let text = resp.text().await?;
            return Err(anyhow!("tts api error ({status}): {text}"));
        }

        let body: SynthesizeResponse = resp.json().await?;
        if body.audio_content.is_empty() {
            return Err(anyhow!("tts api error: empty audio content"));
        }

        Ok(SynthesizedAudio {
            audio_content: body.audio_content,
            mime_type: "audio/mp3".into(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechSynthesizer {
    async fn synthesize(
        &self,
        ssml: &str,
        locale: Locale,
        gender: VoiceGender,
    ) -> Option<SynthesizedAudio> {
        match self.try_synthesize(ssml, locale, gender).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::warn!(locale = locale.as_str(), "speech synthesis failed: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct SynthesizeRequest {
    input: SynthesisInput,
    voice: VoiceSelectionParams,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Debug, Clone, Serialize)]
struct SynthesisInput {
    ssml: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams {
    language_code: String,
    name: String,
    ssml_gender: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}
