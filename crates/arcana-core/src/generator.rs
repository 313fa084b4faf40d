//! Schema-constrained reading generation.

use std::sync::Arc;

use serde_json::json;

use arcana_provider::{
    default_safety_settings, GenerationConfig, LlmMessage, LlmProvider, LlmRequest,
};
use arcana_schema::TarotReadingResponse;

use crate::error::ReadingError;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub const INITIAL_TEMPERATURE: f64 = 0.9;
pub const INITIAL_MAX_OUTPUT_TOKENS: u32 = 800;
pub const FOLLOWUP_TEMPERATURE: f64 = 0.8;
pub const FOLLOWUP_MAX_OUTPUT_TOKENS: u32 = 500;

/// Constrained output schema matching `TarotReadingResponse`.
pub fn reading_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "introduction": {
                "type": "STRING",
                "description": "A brief introduction to the Tarot reading."
            },
            "cardsInterpretation": {
                "type": "ARRAY",
                "description": "An array of interpretations for each Tarot card.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "cardName": {
                            "type": "STRING",
                            "description": "The name of the Tarot card."
                        },
                        "position": {
                            "type": "STRING",
                            "description": "The position of the card in the spread (e.g., \"First\", \"Second\", \"Third\")."
                        },
                        "interpretation": {
                            "type": "STRING",
                            "description": "The detailed interpretation of the card in its position."
                        }
                    },
                    "required": ["cardName", "position", "interpretation"]
                }
            },
            "overallSynthesis": {
                "type": "STRING",
                "description": "A synthesis summarizing the entire reading."
            },
            "actionableSummary": {
                "type": "OBJECT",
                "description": "An actionable summary or advice based on the reading.",
                "properties": {
                    "intro": {
                        "type": "STRING",
                        "description": "An introductory sentence for the actionable points."
                    },
                    "points": {
                        "type": "ARRAY",
                        "description": "A list of actionable advice points.",
                        "items": { "type": "STRING" }
                    }
                },
                "required": ["intro", "points"]
            },
            "conclusion": {
                "type": "STRING",
                "description": "A concluding statement for the reading."
            }
        },
        "required": [
            "introduction",
            "cardsInterpretation",
            "overallSynthesis",
            "actionableSummary",
            "conclusion"
        ]
    })
}

/// A successful initial generation: the raw JSON text as the model emitted
/// it (returned to the caller and persisted) plus its parsed form.
#[derive(Debug, Clone)]
pub struct GeneratedReading {
    pub text: String,
    pub parsed: TarotReadingResponse,
}

pub struct ReadingGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl ReadingGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Generates the initial structured reading. Output that is not valid
    /// JSON conforming to the reading contract is a distinct
    /// `MalformedReading` outcome, not the generic generation failure.
    pub async fn generate_initial(&self, prompt: &str) -> Result<GeneratedReading, ReadingError> {
        let request = LlmRequest {
            model: self.model.clone(),
            system: None,
            messages: vec![LlmMessage::user(prompt)],
            generation: GenerationConfig {
                temperature: Some(INITIAL_TEMPERATURE),
                max_output_tokens: Some(INITIAL_MAX_OUTPUT_TOKENS),
                response_mime_type: Some("application/json".into()),
                response_schema: Some(reading_response_schema()),
            },
            safety: default_safety_settings(),
        };

        let response = self
            .provider
            .generate(request)
            .await
            .map_err(ReadingError::Generation)?;

        let text = response.text.trim().to_string();
        let parsed: TarotReadingResponse = serde_json::from_str(&text)?;
        Ok(GeneratedReading { text, parsed })
    }

    /// Generates a follow-up reply over the full conversation context:
    /// system instruction, prior history, then the new user question.
    pub async fn generate_followup(
        &self,
        system: String,
        mut history: Vec<LlmMessage>,
        question: &str,
    ) -> Result<String, ReadingError> {
        history.push(LlmMessage::user(question));
        let request = LlmRequest {
            model: self.model.clone(),
            system: Some(system),
            messages: history,
            generation: GenerationConfig {
                temperature: Some(FOLLOWUP_TEMPERATURE),
                max_output_tokens: Some(FOLLOWUP_MAX_OUTPUT_TOKENS),
                response_mime_type: None,
                response_schema: None,
            },
            safety: default_safety_settings(),
        };

        let response = self
            .provider
            .generate(request)
            .await
            .map_err(ReadingError::Generation)?;
        Ok(response.text)
    }
}
