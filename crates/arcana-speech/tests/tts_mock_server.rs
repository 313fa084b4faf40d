use arcana_schema::{Locale, VoiceGender};
use arcana_speech::{GoogleSpeechSynthesizer, SpeechSynthesizer};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn synthesize_returns_base64_audio_with_mime_type() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/text:synthesize"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "voice": {
                "languageCode": "en-GB",
                "name": "en-GB-Standard-C",
                "ssmlGender": "FEMALE"
            },
            "audioConfig": {"audioEncoding": "MP3"}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"audioContent": "bXlzdGljYWwgYXVkaW8="})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let synth = GoogleSpeechSynthesizer::new("test-key", server.uri());
    let audio = synth
        .synthesize("<speak>hello</speak>", Locale::En, VoiceGender::Female)
        .await
        .expect("audio");

    assert_eq!(audio.audio_content, "bXlzdGljYWwgYXVkaW8=");
    assert_eq!(audio.mime_type, "audio/mp3");
}

#[tokio::test]
async fn polish_locale_requests_polish_voice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "voice": {
                "languageCode": "pl-PL",
                "name": "pl-PL-Standard-F",
                "ssmlGender": "MALE"
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"audioContent": "YQ=="})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let synth = GoogleSpeechSynthesizer::new("test-key", server.uri());
    let audio = synth
        .synthesize("<speak>cześć</speak>", Locale::Pl, VoiceGender::Male)
        .await;
    assert!(audio.is_some());
}

#[tokio::test]
async fn synthesis_failure_is_folded_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let synth = GoogleSpeechSynthesizer::new("test-key", server.uri());
    let audio = synth
        .synthesize("<speak>hello</speak>", Locale::En, VoiceGender::Female)
        .await;
    assert!(audio.is_none());
}

#[tokio::test]
async fn empty_audio_content_is_folded_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let synth = GoogleSpeechSynthesizer::new("test-key", server.uri());
    let audio = synth
        .synthesize("<speak>hello</speak>", Locale::En, VoiceGender::Female)
        .await;
    assert!(audio.is_none());
}
