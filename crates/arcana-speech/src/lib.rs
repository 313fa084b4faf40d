pub mod google;
pub mod ssml;

pub use google::GoogleSpeechSynthesizer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use arcana_schema::{Locale, VoiceGender};

/// Concrete voice identity for a locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSelection {
    pub language_code: &'static str,
    pub name: &'static str,
}

/// Maps a locale to a concrete voice. The voice names are per-locale
/// defaults; gender is passed through to the service separately.
pub fn voice_for(locale: Locale) -> VoiceSelection {
    match locale {
        Locale::Pl => VoiceSelection {
            language_code: "pl-PL",
            name: "pl-PL-Standard-F",
        },
        Locale::En => VoiceSelection {
            language_code: "en-GB",
            name: "en-GB-Standard-C",
        },
    }
}

/// Base64-encoded audio plus its MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedAudio {
    pub audio_content: String,
    pub mime_type: String,
}

/// Speech synthesis is always best-effort: implementations log failures
/// and return `None`, never an error, past this boundary.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        ssml: &str,
        locale: Locale,
        gender: VoiceGender,
    ) -> Option<SynthesizedAudio>;
}
