// tests/api_routes.rs
// End-to-end checks of the REST surface with fake collaborators

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use memory_lane::api::create_router;
use memory_lane::assembler::{CHAT_APOLOGY, MEMORY_APOLOGY, MUSIC_APOLOGY};
use memory_lane::classifier::{GENERAL_MEMORY_SUGGESTIONS, MEMORY_RECALL_SUGGESTIONS};
use memory_lane::config::AppConfig;
use memory_lane::llm::{GenerationError, TextGenerator};
use memory_lane::state::AppState;
use memory_lane::voice::transcribe::{AudioClip, PlaceholderTranscriber, Transcriber, Transcription, TranscriptionError};

/// Replies with a fixed text and remembers every prompt.
struct EchoGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

struct BrokenGenerator;

#[async_trait]
impl TextGenerator for BrokenGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Api(
            "quota exceeded at projects/123/locations/us: stack trace follows".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

struct FixedTranscriber(&'static str);

#[async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _clip: AudioClip) -> Result<Transcription, TranscriptionError> {
        Ok(Transcription::from_text(self.0))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "MEMORY_LANE_GENERATION_RETRIES" => Some("0".to_string()),
        "MEMORY_LANE_GENERATION_TIMEOUT" => Some("2".to_string()),
        "MEMORY_LANE_DEBUG_ENDPOINTS" => Some("true".to_string()),
        _ => None,
    })
}

fn echo_app(reply: &str) -> (axum::Router, Arc<EchoGenerator>) {
    let generator = Arc::new(EchoGenerator {
        reply: reply.to_string(),
        prompts: Mutex::new(Vec::new()),
    });
    let state = AppState::new(test_config(), generator.clone(), Arc::new(PlaceholderTranscriber));
    (create_router(state), generator)
}

fn broken_app() -> axum::Router {
    create_router(AppState::new(
        test_config(),
        Arc::new(BrokenGenerator),
        Arc::new(PlaceholderTranscriber),
    ))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn multipart_request(field: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "memorylaneboundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/webm\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/voice-to-text")
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

fn assert_safe(body: &Value) {
    let text = body.to_string().to_lowercase();
    for leak in ["stack", "quota", "projects/", "gemini", "http://"] {
        assert!(!text.contains(leak), "response leaked '{leak}': {text}");
    }
}

#[tokio::test]
async fn test_health() {
    let (app, _) = echo_app("hi");
    let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "gemini-1.5-flash");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_chat_returns_generated_text() {
    let (app, generator) = echo_app("Hello there! How is your day going?");
    let (status, body) = send(
        app,
        post_json("/api/chat", json!({ "message": "Good morning", "context": "in the garden" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Hello there! How is your day going?");
    assert!(body["timestamp"].is_string());

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Good morning"));
    assert!(prompts[0].contains("in the garden"));
}

#[tokio::test]
async fn test_chat_requires_message() {
    for body in [json!({}), json!({ "message": "" }), json!({ "message": "   " })] {
        let (app, generator) = echo_app("unused");
        let (status, response) = send(app, post_json("/api/chat", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].as_str().unwrap().contains("message"));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_chat_rejects_non_json() {
    let (app, _) = echo_app("unused");
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_generation_failures_become_apologies() {
    let cases = [
        ("/api/chat", json!({ "message": "hello" }), CHAT_APOLOGY),
        ("/api/memory-lane", json!({ "query": "my wedding" }), MEMORY_APOLOGY),
        ("/api/spotify", json!({ "mood": "calm" }), MUSIC_APOLOGY),
    ];

    for (uri, request, apology) in cases {
        let (status, body) = send(broken_app(), post_json(uri, request)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body["error"], apology);
        assert_eq!(body["response"], apology);
        assert_safe(&body);
    }
}

#[tokio::test]
async fn test_memory_lane_recall_query() {
    let (app, _) = echo_app("What a lovely memory.");
    let (status, body) = send(
        app,
        post_json("/api/memory-lane", json!({ "query": "I remember our first house", "memoryType": "Childhood" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "What a lovely memory.");
    assert_eq!(body["memoryType"], "childhood");
    let suggestions: Vec<String> = serde_json::from_value(body["suggestions"].clone()).unwrap();
    assert_eq!(suggestions, MEMORY_RECALL_SUGGESTIONS);
}

#[tokio::test]
async fn test_memory_lane_empty_request_is_general() {
    let (app, generator) = echo_app("Let's reminisce.");
    let (status, body) = send(app, post_json("/api/memory-lane", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["memoryType"], "general");
    let suggestions: Vec<String> = serde_json::from_value(body["suggestions"].clone()).unwrap();
    assert_eq!(suggestions, GENERAL_MEMORY_SUGGESTIONS);
    assert_eq!(generator.prompts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_spotify_defaults_and_playlists() {
    let (app, _) = echo_app("Here is something gentle.");
    let (status, body) = send(app, post_json("/api/spotify", json!({ "mood": "calm" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "suggest");
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 5);
    let playlists = body["playlists"].as_array().unwrap();
    assert_eq!(playlists.len(), 3);
    assert_eq!(playlists[0]["name"], "Peaceful Piano");
}

#[tokio::test]
async fn test_test_message_echo() {
    let (app, _) = echo_app("unused");
    let (status, body) = send(app, post_json("/api/test-message", json!({ "message": "Hello" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], "Hello");
    assert_eq!(body["echo"], "You said: \"Hello\"");
    assert_eq!(body["status"], "Message captured successfully");
}

#[tokio::test]
async fn test_test_message_hidden_when_debug_off() {
    let config = AppConfig::from_lookup(|key| (key == "MEMORY_LANE_DEBUG_ENDPOINTS").then(|| "false".to_string()));
    let app = create_router(AppState::new(
        config,
        Arc::new(BrokenGenerator),
        Arc::new(PlaceholderTranscriber),
    ));
    let (status, _) = send(app, post_json("/api/test-message", json!({ "message": "Hello" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_voice_to_text() {
    let app = create_router(AppState::new(
        test_config(),
        Arc::new(BrokenGenerator),
        Arc::new(FixedTranscriber("  I would like some music  ")),
    ));
    let (status, body) = send(app, multipart_request("audio", "clip.webm", b"fake audio")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "I would like some music");
    assert!(body["confidence"].as_f64().unwrap() > 0.5);
}

#[tokio::test]
async fn test_voice_to_text_requires_audio() {
    let (app, _) = echo_app("unused");
    let (status, body) = send(app, multipart_request("notes", "clip.webm", b"fake audio")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("audio"));

    let (app, _) = echo_app("unused");
    let (status, _) = send(app, multipart_request("audio", "clip.webm", b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (app, _) = echo_app("unused");
    let (status, _) = send(app, post_json("/api/voice-to-text", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_voice_to_text_rejects_oversized_upload() {
    let config = AppConfig::from_lookup(|key| match key {
        "MEMORY_LANE_MAX_UPLOAD_BYTES" => Some("64".to_string()),
        _ => None,
    });
    let app = create_router(AppState::new(
        config,
        Arc::new(BrokenGenerator),
        Arc::new(FixedTranscriber("never reached")),
    ));
    let (status, body) = send(app, multipart_request("audio", "clip.webm", &[0u8; 1024])).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("too long"));
    assert_safe(&body);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _) = echo_app("unused");
    let request = Request::builder().uri("/api/nowhere").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "NOT_FOUND");
}
