use std::path::PathBuf;
use std::time::Duration;

use subtitler::application::ports::{TranscriptionEngine, TranscriptionError};
use subtitler::domain::LanguageHint;
use subtitler::infrastructure::stt::{
    AzureWhisperEngine, MultipartTranscriber, OpenAiWhisperEngine, ProviderAuth,
    ProviderConfig, TranscriptionEngineFactory, TranscriptionProvider, ZHIPU_MAX_AUDIO_SECONDS,
    ZhipuAsrEngine,
};

use crate::helpers::fakes::write_wav;
use crate::helpers::mock_stt_server::MockSttServer;

const VERBOSE_BODY: &str = r#"{
    "text": "hello world",
    "segments": [
        {"id": 0, "start": 0.0, "end": 1.5, "text": " hello "},
        {"id": 1, "start": 1.5, "end": 3.0, "text": "world", "speaker": "A"}
    ]
}"#;

fn sample_audio(dir: &tempfile::TempDir, seconds: f64) -> PathBuf {
    let path = dir.path().join("sample.wav");
    write_wav(&path, seconds);
    path
}

fn whisper(server: &MockSttServer) -> OpenAiWhisperEngine {
    OpenAiWhisperEngine::new(
        "sk-test".to_string(),
        Some(server.url("/v1/audio/transcriptions")),
        None,
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn given_verbose_json_when_whisper_transcribes_then_segments_and_form_fields_match() {
    let server = MockSttServer::start("/v1/audio/transcriptions", 200, VERBOSE_BODY).await;
    let dir = tempfile::tempdir().unwrap();
    let audio = sample_audio(&dir, 1.0);

    let segments = whisper(&server)
        .transcribe_file(&audio, &LanguageHint::parse("zh-CN"))
        .await
        .unwrap();

    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].text, "hello");
    assert_eq!(segments[1].speaker.as_deref(), Some("A"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.field("model"), Some("whisper-1"));
    assert_eq!(request.field("response_format"), Some("verbose_json"));
    assert_eq!(request.field("language"), Some("zh"));
    assert_eq!(request.field("file"), Some("sample.wav"));
    assert!(request.file_bytes > 44);
    assert_eq!(request.header("authorization"), Some("Bearer sk-test"));
}

#[tokio::test]
async fn given_auto_language_when_whisper_transcribes_then_language_field_is_omitted() {
    let server = MockSttServer::start("/v1/audio/transcriptions", 200, VERBOSE_BODY).await;
    let dir = tempfile::tempdir().unwrap();
    let audio = sample_audio(&dir, 1.0);

    whisper(&server)
        .transcribe_file(&audio, &LanguageHint::Auto)
        .await
        .unwrap();

    assert_eq!(server.requests()[0].field("language"), None);
}

#[tokio::test]
async fn given_upstream_503_when_transcribing_then_api_request_failed() {
    let server =
        MockSttServer::start("/v1/audio/transcriptions", 503, r#"{"error":"busy"}"#).await;
    let dir = tempfile::tempdir().unwrap();
    let audio = sample_audio(&dir, 1.0);

    let err = whisper(&server)
        .transcribe_file(&audio, &LanguageHint::Auto)
        .await
        .unwrap_err();

    match err {
        TranscriptionError::ApiRequestFailed(message) => assert!(message.contains("503")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn given_text_only_body_when_transcribing_then_one_unplaced_segment() {
    let server =
        MockSttServer::start("/v1/audio/transcriptions", 200, r#"{"text":"  just text  "}"#)
            .await;
    let dir = tempfile::tempdir().unwrap();
    let audio = sample_audio(&dir, 1.0);

    let segments = whisper(&server)
        .transcribe_file(&audio, &LanguageHint::Auto)
        .await
        .unwrap();

    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].text, "just text");
    assert_eq!((segments[0].start_time, segments[0].end_time), (0.0, 0.0));
}

#[tokio::test]
async fn given_non_json_body_when_transcribing_then_invalid_response() {
    let server = MockSttServer::start("/v1/audio/transcriptions", 200, "<html>").await;
    let dir = tempfile::tempdir().unwrap();
    let audio = sample_audio(&dir, 1.0);

    let err = whisper(&server)
        .transcribe_file(&audio, &LanguageHint::Auto)
        .await
        .unwrap_err();

    assert!(matches!(err, TranscriptionError::InvalidResponse(_)));
}

#[tokio::test]
async fn given_audio_over_byte_limit_when_sending_then_no_request_is_made() {
    let server = MockSttServer::start("/upload", 200, VERBOSE_BODY).await;
    let dir = tempfile::tempdir().unwrap();
    let audio = sample_audio(&dir, 1.0);
    let transcriber = MultipartTranscriber::new(
        server.url("/upload"),
        ProviderAuth::Bearer("k".to_string()),
        Duration::from_secs(5),
    )
    .unwrap()
    .with_max_audio_bytes(100);

    let err = transcriber.send("test", &audio, None).await.unwrap_err();

    assert!(matches!(
        err,
        TranscriptionError::SizeLimitExceeded { limit: 100, .. }
    ));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn given_zhipu_engine_when_transcribing_then_it_reports_a_30s_limit_and_sends_glm_model() {
    let server = MockSttServer::start("/asr", 200, VERBOSE_BODY).await;
    let dir = tempfile::tempdir().unwrap();
    let audio = sample_audio(&dir, 1.0);
    let engine = ZhipuAsrEngine::new(
        "zk".to_string(),
        Some(server.url("/asr")),
        None,
        Duration::from_secs(5),
    )
    .unwrap();

    assert_eq!(engine.limits().max_audio_seconds, Some(ZHIPU_MAX_AUDIO_SECONDS));
    engine
        .transcribe_file(&audio, &LanguageHint::parse("en-US"))
        .await
        .unwrap();

    let request = &server.requests()[0];
    assert_eq!(request.field("model"), Some("glm-asr"));
    assert_eq!(request.field("language"), Some("en"));
    assert_eq!(request.field("response_format"), None);
}

#[tokio::test]
async fn given_azure_engine_when_transcribing_then_api_key_header_and_version_query_are_sent() {
    let server = MockSttServer::start(
        "/openai/deployments/{deployment}/audio/transcriptions",
        200,
        VERBOSE_BODY,
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let audio = sample_audio(&dir, 1.0);
    let engine = AzureWhisperEngine::new(
        &format!("{}/", server.base_url),
        "whisper-prod",
        "azure-key",
        "2024-06-01",
        None,
        Duration::from_secs(5),
    )
    .unwrap();

    assert!(
        engine
            .endpoint()
            .ends_with("/openai/deployments/whisper-prod/audio/transcriptions?api-version=2024-06-01")
    );
    engine
        .transcribe_file(&audio, &LanguageHint::Auto)
        .await
        .unwrap();

    let request = &server.requests()[0];
    assert_eq!(request.header("api-key"), Some("azure-key"));
    assert_eq!(request.header("authorization"), None);
    assert_eq!(request.query.as_deref(), Some("api-version=2024-06-01"));
    assert_eq!(request.field("model"), None);
}

#[test]
fn given_missing_api_key_when_creating_engine_then_configuration_error() {
    let result = TranscriptionEngineFactory::create(
        TranscriptionProvider::Whisper,
        ProviderConfig {
            api_key: "  ".to_string(),
            timeout: Duration::from_secs(1),
            ..ProviderConfig::default()
        },
    );

    assert!(matches!(result, Err(TranscriptionError::Configuration(_))));
}

#[test]
fn given_azure_without_deployment_when_creating_engine_then_configuration_error() {
    let result = TranscriptionEngineFactory::create(
        TranscriptionProvider::Azure,
        ProviderConfig {
            api_key: "k".to_string(),
            endpoint: Some("https://example.openai.azure.com".to_string()),
            timeout: Duration::from_secs(1),
            ..ProviderConfig::default()
        },
    );

    assert!(matches!(result, Err(TranscriptionError::Configuration(_))));
}

#[tokio::test]
async fn given_any_adapter_when_streaming_then_unsupported() {
    let server = MockSttServer::start("/v1/audio/transcriptions", 200, VERBOSE_BODY).await;
    let (sink, _segments) = tokio::sync::mpsc::channel(1);
    let audio = futures::StreamExt::boxed(futures::stream::empty());

    let err = whisper(&server)
        .transcribe_stream(audio, &LanguageHint::Auto, sink)
        .await
        .unwrap_err();

    assert!(matches!(err, TranscriptionError::Unsupported(_)));
    assert!(server.requests().is_empty());
}
