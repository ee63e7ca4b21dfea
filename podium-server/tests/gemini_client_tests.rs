//! Gemini client and analyzer tests against a mock server

use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use podium_server::analysis::gemini::{FileState, RemoteFile};
use podium_server::analysis::{
    GeminiAnalyzer, GeminiClient, GeminiError, MediaAnalyzer, MediaRef, PollSettings,
    FALLBACK_VIDEO_SUGGESTION,
};
use podium_server::grading::Grade;

const API_KEY: &str = "test-key";
const MODEL: &str = "gemini-test";
const FILE_NAME: &str = "files/abc123";

fn fast_poll() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        timeout: Duration::from_millis(500),
    }
}

fn media_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"fake media bytes").unwrap();
    file
}

fn remote_file(state: &str) -> serde_json::Value {
    json!({
        "name": FILE_NAME,
        "uri": "https://example.invalid/files/abc123",
        "mimeType": "video/mp4",
        "state": state
    })
}

fn model_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    })
}

/// Mount the two upload steps; the finalize step reports `state`
async fn mount_upload(server: &MockServer, state: &str) {
    let session_url = format!("{}/upload-session/1", server.uri());

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header("x-goog-api-key", API_KEY))
        .and(header("X-Goog-Upload-Command", "start"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Goog-Upload-URL", session_url.as_str()))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload-session/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "file": remote_file(state) })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_delete(server: &MockServer) {
    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(server)
        .await;
}

fn analyzer(server: &MockServer) -> GeminiAnalyzer {
    let client = GeminiClient::with_base_url(API_KEY, MODEL, &server.uri()).unwrap();
    GeminiAnalyzer::new(client, fast_poll())
}

#[tokio::test]
async fn test_video_analysis_round() {
    let server = MockServer::start().await;
    mount_upload(&server, "PROCESSING").await;
    mount_delete(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_file("ACTIVE")))
        .mount(&server)
        .await;

    let reply = "```json\n{\"expression\": 82, \"intonation\": \"74.5\", \"posture\": 91,\n\
                 \"overall_rating\": \"a\", \"suggestion\": \"Pause between points.\",\n\
                 \"questions\": [\"Who is the audience?\", \"What is the next step?\"]}\n```";
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let file = media_file();
    let analysis = analyzer(&server)
        .analyze_presentation(&MediaRef::new(file.path(), "video/mp4"))
        .await;

    assert!(!analysis.is_fallback);
    assert_eq!(analysis.expression, 82.0);
    assert_eq!(analysis.intonation, 74.5);
    assert_eq!(analysis.posture, 91.0);
    assert_eq!(analysis.overall_rating, Grade::A);
    assert_eq!(analysis.suggestion, "Pause between points.");
    assert_eq!(analysis.questions.len(), 2);
}

#[tokio::test]
async fn test_answer_analysis() {
    let server = MockServer::start().await;
    mount_upload(&server, "ACTIVE").await;
    mount_delete(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_reply(
            r#"Sure! {"score": 77, "suggestion": "Be concise.", "is_relevant": "yes"}"#,
        )))
        .mount(&server)
        .await;

    let file = media_file();
    let analysis = analyzer(&server)
        .analyze_answer(&MediaRef::new(file.path(), "audio/mpeg"), "Why this topic?")
        .await;

    assert!(!analysis.is_fallback);
    assert_eq!(analysis.score, 77.0);
    assert_eq!(analysis.suggestion, "Be concise.");
    assert!(analysis.is_relevant);
}

#[tokio::test]
async fn test_model_error_falls_back_and_cleans_up() {
    let server = MockServer::start().await;
    mount_upload(&server, "ACTIVE").await;
    mount_delete(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", MODEL)))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let file = media_file();
    let analysis = analyzer(&server)
        .analyze_presentation(&MediaRef::new(file.path(), "video/mp4"))
        .await;

    assert!(analysis.is_fallback);
    assert_eq!(analysis.video_score(), 0.0);
    assert_eq!(analysis.suggestion, FALLBACK_VIDEO_SUGGESTION);
}

#[tokio::test]
async fn test_failed_processing_falls_back() {
    let server = MockServer::start().await;
    mount_upload(&server, "FAILED").await;
    mount_delete(&server).await;

    let file = media_file();
    let analysis = analyzer(&server)
        .analyze_answer(&MediaRef::new(file.path(), "audio/wav"), "Anything?")
        .await;

    assert!(analysis.is_fallback);
    assert_eq!(analysis.score, 0.0);
    assert!(!analysis.is_relevant);
}

#[tokio::test]
async fn test_wait_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(remote_file("PROCESSING")))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url(API_KEY, MODEL, &server.uri()).unwrap();
    let file: RemoteFile = serde_json::from_value(remote_file("PROCESSING")).unwrap();
    assert_eq!(file.state, FileState::Processing);

    let result = client
        .wait_until_active(file, Duration::from_millis(10), Duration::from_millis(50))
        .await;

    assert!(matches!(result, Err(GeminiError::Timeout { .. })));
}

#[tokio::test]
async fn test_empty_reply_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v1beta/models/{}:generateContent", MODEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let client = GeminiClient::with_base_url(API_KEY, MODEL, &server.uri()).unwrap();
    let file: RemoteFile = serde_json::from_value(remote_file("ACTIVE")).unwrap();

    let result = client.generate_content(&file, "prompt").await;
    assert!(matches!(result, Err(GeminiError::EmptyResponse)));
}
