pub mod gemini;

pub use gemini::GeminiProvider;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Harm categories the generation service filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmThreshold {
    #[serde(rename = "BLOCK_LOW_AND_ABOVE")]
    BlockLowAndAbove,
    #[serde(rename = "BLOCK_MEDIUM_AND_ABOVE")]
    BlockMediumAndAbove,
    #[serde(rename = "BLOCK_ONLY_HIGH")]
    BlockOnlyHigh,
    #[serde(rename = "BLOCK_NONE")]
    BlockNone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmThreshold,
}

/// All four harm categories blocked at medium-and-above severity.
pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::DangerousContent,
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmThreshold::BlockMediumAndAbove,
    })
    .collect()
}

/// Decoding configuration for one generation call. `response_schema`
/// constrains the model to emit JSON matching the given shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub response_mime_type: Option<String>,
    pub response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: String,
    pub text: String,
}

impl LlmMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub model: String,
    pub system: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub generation: GenerationConfig,
    pub safety: Vec<SafetySetting>,
}

impl LlmRequest {
    /// Single-turn request with the default safety thresholds.
    pub fn simple(model: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            messages: vec![LlmMessage::user(user)],
            generation: GenerationConfig::default(),
            safety: default_safety_settings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub finish_reason: Option<String>,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harm_category_wire_names() {
        assert_eq!(
            serde_json::to_value(HarmCategory::DangerousContent).unwrap(),
            "HARM_CATEGORY_DANGEROUS_CONTENT"
        );
        assert_eq!(
            serde_json::to_value(HarmThreshold::BlockMediumAndAbove).unwrap(),
            "BLOCK_MEDIUM_AND_ABOVE"
        );
    }

    #[test]
    fn default_safety_covers_all_four_categories() {
        let settings = default_safety_settings();
        assert_eq!(settings.len(), 4);
        assert!(settings
            .iter()
            .all(|s| s.threshold == HarmThreshold::BlockMediumAndAbove));
        let categories: Vec<_> = settings.iter().map(|s| s.category).collect();
        assert!(categories.contains(&HarmCategory::Harassment));
        assert!(categories.contains(&HarmCategory::HateSpeech));
    }

    #[test]
    fn simple_request_is_single_user_turn() {
        let req = LlmRequest::simple("gemini-2.0-flash", "hello");
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, "user");
        assert_eq!(req.safety.len(), 4);
        assert!(req.generation.temperature.is_none());
    }
}
