// tests/gemini_client.rs
// Gemini client against a local stand-in for generateContent

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use memory_lane::config::AppConfig;
use memory_lane::llm::{GeminiClient, GenerationError, RateLimiter, TextGenerator};

#[derive(Default)]
struct Seen {
    path: Option<String>,
    key: Option<String>,
    query: Option<String>,
    body: Option<Value>,
}

async fn start_mock(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Seen>>) {
    let seen = Arc::new(Mutex::new(Seen::default()));

    let app = Router::new()
        .route(
            "/v1beta/models/{call}",
            post(
                move |State(seen): State<Arc<Mutex<Seen>>>,
                      Path(call): Path<String>,
                      RawQuery(query): RawQuery,
                      headers: HeaderMap,
                      Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        let mut seen = seen.lock().unwrap();
                        seen.path = Some(call);
                        seen.key = headers
                            .get("x-goog-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.query = query;
                        seen.body = Some(body);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1beta"), seen)
}

fn client_for(base_url: &str, api_key: Option<&str>) -> GeminiClient {
    let base_url = base_url.to_string();
    let api_key = api_key.map(str::to_string);
    let config = AppConfig::from_lookup(move |key| match key {
        "GEMINI_BASE_URL" => Some(base_url.clone()),
        "GEMINI_API_KEY" => api_key.clone(),
        "MEMORY_LANE_MAX_OUTPUT_TOKENS" => Some("120".to_string()),
        _ => None,
    });
    GeminiClient::new(&config, Arc::new(RateLimiter::per_minute(0)))
}

#[tokio::test]
async fn test_generate_sends_prompt_and_joins_parts() {
    let (base_url, seen) = start_mock(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello! " }, { "text": "Lovely to see you." }] }
            }]
        }),
    )
    .await;

    let client = client_for(&base_url, Some("test-key"));
    let text = client.generate("Say hello").await.unwrap();
    assert_eq!(text, "Hello! Lovely to see you.");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.path.as_deref(), Some("gemini-1.5-flash:generateContent"));
    assert_eq!(seen.key.as_deref(), Some("test-key"));
    assert!(seen.query.is_none());
    let body = seen.body.as_ref().unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Say hello");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 120);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let (base_url, _) = start_mock(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "Resource exhausted" } }),
    )
    .await;

    let err = client_for(&base_url, Some("test-key"))
        .generate("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Status { status: 429, .. }));
}

#[tokio::test]
async fn test_blank_candidate_is_empty_response() {
    let (base_url, _) = start_mock(StatusCode::OK, json!({ "candidates": [] })).await;

    let err = client_for(&base_url, Some("test-key"))
        .generate("hello")
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResponse));
}

#[tokio::test]
async fn test_missing_key_never_calls_service() {
    let (base_url, seen) = start_mock(StatusCode::OK, json!({})).await;

    let err = client_for(&base_url, None).generate("hello").await.unwrap_err();
    assert!(matches!(err, GenerationError::NotConfigured(_)));
    assert!(seen.lock().unwrap().path.is_none());
}

#[tokio::test]
async fn test_transport_error_does_not_reveal_key() {
    // Nothing listens on the discard port.
    let err = client_for("http://127.0.0.1:9/v1beta", Some("SECRET-KEY-123"))
        .generate("hello")
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Transport(_)));
    let shown = format!("{err} {err:?}");
    assert!(!shown.contains("SECRET-KEY-123"), "{shown}");
    assert!(!shown.contains("key="), "{shown}");
}
