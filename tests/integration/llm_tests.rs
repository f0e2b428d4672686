use goal_breaker::decomposition::{GoalBreakdown, GoalDecomposer};
use goal_breaker::llm::gemini::GeminiClient;
use goal_breaker::llm::openai_compat::OpenAiCompatClient;
use goal_breaker::llm::LlmClient;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::VALID_PAYLOAD;

const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn gemini_client(server: &MockServer) -> GeminiClient {
    GeminiClient::new(
        "test-key".to_string(),
        "gemini-2.5-flash".to_string(),
        2048,
        Some(server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }],
        "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 40 }
    })
}

#[tokio::test]
async fn test_gemini_generate_sends_key_and_reads_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("hello")))
        .expect(1)
        .mount(&server)
        .await;

    let response = gemini_client(&server).generate("Say hello").await.unwrap();

    assert_eq!(response.text, "hello");
    let usage = response.usage.unwrap();
    assert_eq!(usage.input_tokens, 120);
    assert_eq!(usage.output_tokens, 40);
}

#[tokio::test]
async fn test_gemini_joins_multiple_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"tasks\":" }, { "text": " []}" }] }
            }]
        })))
        .mount(&server)
        .await;

    let response = gemini_client(&server).generate("x").await.unwrap();
    assert_eq!(response.text, "{\"tasks\": []}");
    assert!(response.usage.is_none());
}

#[tokio::test]
async fn test_gemini_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("quota exceeded"))
        .mount(&server)
        .await;

    let err = gemini_client(&server).generate("x").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("500"), "unexpected error: {}", message);
    assert!(message.contains("quota exceeded"));
}

#[tokio::test]
async fn test_gemini_without_candidates_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    assert!(gemini_client(&server).generate("x").await.is_err());
}

#[tokio::test]
async fn test_openai_compat_sends_bearer_and_reads_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "done" } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(
        server.uri(),
        Some("sk-test".to_string()),
        "gpt-4o-mini".to_string(),
        2048,
        Duration::from_secs(5),
    )
    .unwrap();

    let response = client.generate("x").await.unwrap();
    assert_eq!(response.text, "done");
    assert_eq!(client.model(), "gpt-4o-mini");
    assert_eq!(response.usage.unwrap().output_tokens, 2);
}

#[tokio::test]
async fn test_openai_compat_missing_content_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": null } }]
        })))
        .mount(&server)
        .await;

    let client = OpenAiCompatClient::new(
        server.uri(),
        None,
        "llama3.1".to_string(),
        2048,
        Duration::from_secs(5),
    )
    .unwrap();

    assert!(client.generate("x").await.is_err());
}

#[tokio::test]
async fn test_decomposer_over_gemini_parses_fenced_reply() {
    let server = MockServer::start().await;
    let fenced = format!("```json\n{}\n```", VALID_PAYLOAD);
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(&fenced)))
        .mount(&server)
        .await;

    let decomposer = GoalDecomposer::new(Arc::new(gemini_client(&server)), Duration::from_secs(5));
    let breakdown = decomposer.decompose("Learn to play piano").await;

    assert_eq!(breakdown.tasks, ["a", "b", "c", "d", "e"]);
    assert_eq!(breakdown.complexity_score.get(), 3);
}

#[tokio::test]
async fn test_decomposer_over_failing_backend_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let decomposer = GoalDecomposer::new(Arc::new(gemini_client(&server)), Duration::from_secs(5));
    assert_eq!(decomposer.decompose("Learn Rust").await, GoalBreakdown::fallback());
}

#[tokio::test]
async fn test_decomposer_over_slow_backend_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GEMINI_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply(VALID_PAYLOAD))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let decomposer =
        GoalDecomposer::new(Arc::new(gemini_client(&server)), Duration::from_millis(100));
    assert_eq!(decomposer.decompose("Learn Rust").await, GoalBreakdown::fallback());
}
