use arcana_provider::{
    default_safety_settings, GeminiProvider, GenerationConfig, LlmMessage, LlmProvider, LlmRequest,
};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_gemini_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": text}]
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
    })
}

#[tokio::test]
async fn generate_posts_to_model_endpoint_with_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_gemini_response("The cards speak.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key", server.uri());
    let resp = provider
        .generate(LlmRequest::simple("gemini-2.0-flash", "read my cards"))
        .await
        .unwrap();

    assert_eq!(resp.text, "The cards speak.");
    assert_eq!(resp.input_tokens, Some(10));
    assert_eq!(resp.output_tokens, Some(5));
    assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn generate_sends_safety_and_decoding_config() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(body_partial_json(serde_json::json!({
            "safetySettings": [
                {"category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                {"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                {"category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE"},
                {"category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"}
            ],
            "generationConfig": {
                "temperature": 0.0,
                "maxOutputTokens": 20,
                "responseMimeType": "application/json"
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mock_gemini_response(r#"{"isValid":true}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key", server.uri());
    let resp = provider
        .generate(LlmRequest {
            model: "gemini-2.0-flash".into(),
            system: None,
            messages: vec![LlmMessage::user("How can I improve myself?")],
            generation: GenerationConfig {
                temperature: Some(0.0),
                max_output_tokens: Some(20),
                response_mime_type: Some("application/json".into()),
                response_schema: None,
            },
            safety: default_safety_settings(),
        })
        .await
        .unwrap();

    assert_eq!(resp.text, r#"{"isValid":true}"#);
}

#[tokio::test]
async fn generate_surfaces_api_errors_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key", server.uri());
    let err = provider
        .generate(LlmRequest::simple("gemini-2.0-flash", "hi"))
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("429"));
    assert!(msg.contains("[retryable]"));
}

#[tokio::test]
async fn multi_turn_history_is_forwarded_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "contents": [
                {"role": "model", "parts": [{"text": "initial reading"}]},
                {"role": "user", "parts": [{"text": "what about my career?"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_gemini_response("A change.")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key", server.uri());
    let resp = provider
        .generate(LlmRequest {
            model: "gemini-2.0-flash".into(),
            system: Some("you already read these cards".into()),
            messages: vec![
                LlmMessage::model("initial reading"),
                LlmMessage::user("what about my career?"),
            ],
            generation: GenerationConfig {
                temperature: Some(0.8),
                max_output_tokens: Some(500),
                ..GenerationConfig::default()
            },
            safety: default_safety_settings(),
        })
        .await
        .unwrap();

    assert_eq!(resp.text, "A change.");
}
