//! Fail-closed question classification.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use arcana_provider::{
    default_safety_settings, GenerationConfig, LlmMessage, LlmProvider, LlmRequest,
};
use arcana_schema::Locale;

use crate::prompts;

pub const VALIDATION_TEMPERATURE: f64 = 0.0;
pub const VALIDATION_MAX_OUTPUT_TOKENS: u32 = 20;

/// Constrained output schema for the classification call.
pub fn validation_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isValid": {
                "type": "BOOLEAN",
                "description": "True if the question is suitable for a Tarot reading, false otherwise."
            }
        },
        "required": ["isValid"]
    })
}

#[derive(Debug, Deserialize)]
struct ValidationVerdict {
    #[serde(rename = "isValid")]
    is_valid: bool,
}

/// Classifies free-text questions as acceptable or not by delegating to a
/// text model at zero temperature with a `{ isValid: boolean }` schema.
/// Every failure mode (transport error, unparseable output, missing field)
/// classifies as invalid; nothing is surfaced past this boundary.
pub struct QuestionValidator {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl QuestionValidator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Empty or whitespace-only input is invalid with no external call.
    pub async fn validate(&self, question: &str, locale: Locale) -> bool {
        if question.trim().is_empty() {
            return false;
        }

        let request = LlmRequest {
            model: self.model.clone(),
            system: None,
            messages: vec![LlmMessage::user(prompts::compose_validation_prompt(
                question, locale,
            ))],
            generation: GenerationConfig {
                temperature: Some(VALIDATION_TEMPERATURE),
                max_output_tokens: Some(VALIDATION_MAX_OUTPUT_TOKENS),
                response_mime_type: Some("application/json".into()),
                response_schema: Some(validation_schema()),
            },
            safety: default_safety_settings(),
        };

        let response = match self.provider.generate(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("question validation call failed: {e}");
                return false;
            }
        };

        match serde_json::from_str::<ValidationVerdict>(response.text.trim()) {
            Ok(verdict) => verdict.is_valid,
            Err(e) => {
                tracing::warn!(raw = %response.text, "unparseable validator output: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use arcana_provider::LlmResponse;

    struct ScriptedProvider {
        calls: AtomicUsize,
        requests: Mutex<Vec<LlmRequest>>,
        reply: anyhow::Result<String>,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                reply: Ok(text.to_string()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                reply: Err(anyhow!(message.to_string())),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn generate(&self, request: LlmRequest) -> anyhow::Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Ok(text) => Ok(LlmResponse {
                    text: text.clone(),
                    input_tokens: None,
                    output_tokens: None,
                    finish_reason: Some("stop".into()),
                }),
                Err(e) => Err(anyhow!(e.to_string())),
            }
        }
    }

    fn validator(provider: Arc<ScriptedProvider>) -> QuestionValidator {
        QuestionValidator::new(provider, "gemini-2.0-flash")
    }

    #[tokio::test]
    async fn blank_input_is_invalid_without_an_external_call() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"isValid": true}"#));
        let validator = validator(Arc::clone(&provider));

        assert!(!validator.validate("", Locale::En).await);
        assert!(!validator.validate("   \n", Locale::En).await);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sensible_question_classifies_as_valid() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"isValid": true}"#));
        let validator = validator(Arc::clone(&provider));

        assert!(validator.validate("How can I improve myself?", Locale::En).await);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let requests = provider.requests.lock().unwrap();
        let prompt = &requests[0].messages[0].text;
        assert!(prompt.contains("How can I improve myself?"));
        assert!(prompt.starts_with("You are a filter"));
        assert_eq!(requests[0].generation.temperature, Some(0.0));
        assert_eq!(requests[0].generation.max_output_tokens, Some(20));
        assert!(requests[0].generation.response_schema.is_some());
    }

    #[tokio::test]
    async fn gibberish_verdict_classifies_as_invalid() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"isValid": false}"#));
        let validator = validator(provider);
        assert!(!validator.validate("asdflkjasdflkjasdf", Locale::En).await);
    }

    #[tokio::test]
    async fn unparseable_output_fails_closed() {
        let provider = Arc::new(ScriptedProvider::replying("definitely not json"));
        let validator = validator(provider);
        assert!(!validator.validate("What should I do next?", Locale::En).await);
    }

    #[tokio::test]
    async fn missing_field_fails_closed() {
        let provider = Arc::new(ScriptedProvider::replying(r#"{"verdict": true}"#));
        let validator = validator(provider);
        assert!(!validator.validate("What should I do next?", Locale::En).await);
    }

    #[tokio::test]
    async fn transport_failure_fails_closed() {
        let provider = Arc::new(ScriptedProvider::failing("503"));
        let validator = validator(provider);
        assert!(!validator.validate("What should I do next?", Locale::En).await);
    }

    #[test]
    fn schema_requires_the_boolean_field() {
        let schema = validation_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["isValid"]["type"], "BOOLEAN");
        assert_eq!(schema["required"][0], "isValid");
    }
}
