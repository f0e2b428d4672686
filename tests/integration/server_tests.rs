use axum::http::StatusCode;
use serde_json::json;

use super::common::*;

#[tokio::test]
async fn test_create_goal_returns_breakdown_and_cookie() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;

    let response = send(
        &app,
        "POST",
        "/api/goals",
        None,
        Some(json!({ "goal_text": "Learn to play piano" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let cookie = response.set_cookie.clone().expect("session cookie issued");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=31536000"));
    assert!(cookie.contains("SameSite=None"));
    assert!(cookie.contains("Secure"));

    let body = &response.body;
    assert_eq!(body["goal_text"], "Learn to play piano");
    assert_eq!(body["complexity_score"], 3);
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 5);
    for (i, task) in tasks.iter().enumerate() {
        assert_eq!(task["order"], i as i64 + 1);
    }
    assert_eq!(tasks[0]["task_text"], "a");
    assert_eq!(tasks[4]["task_text"], "e");
}

#[tokio::test]
async fn test_existing_session_is_reused() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;

    let response = send(
        &app,
        "POST",
        "/api/goals",
        Some("my-session"),
        Some(json!({ "goal_text": "Run a marathon" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.session_id().as_deref(), Some("my-session"));
}

#[tokio::test]
async fn test_backend_failure_still_creates_fallback_goal() {
    let app = test_app(FakeLlmClient::failing("service unavailable")).await;

    let response = send(
        &app,
        "POST",
        "/api/goals",
        Some("s1"),
        Some(json!({ "goal_text": "Learn Python" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["complexity_score"], 5);
    assert_eq!(
        response.body["tasks"][0]["task_text"],
        "Research and gather information about this goal"
    );
}

#[tokio::test]
async fn test_goal_text_length_is_validated() {
    let client = FakeLlmClient::replying(VALID_PAYLOAD);
    let app = test_app(client.clone()).await;

    let empty = send(&app, "POST", "/api/goals", None, Some(json!({ "goal_text": "" }))).await;
    assert_eq!(empty.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(empty.body["code"], "INVALID_GOAL_TEXT");

    let long = "a".repeat(501);
    let too_long = send(&app, "POST", "/api/goals", None, Some(json!({ "goal_text": long }))).await;
    assert_eq!(too_long.status, StatusCode::UNPROCESSABLE_ENTITY);

    let exact = "a".repeat(500);
    let ok = send(&app, "POST", "/api/goals", None, Some(json!({ "goal_text": exact }))).await;
    assert_eq!(ok.status, StatusCode::CREATED);

    // Rejected requests never reach the backend
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;

    let response = send(&app, "POST", "/api/goals", None, Some(json!({ "goal": "wrong key" }))).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["code"], "INVALID_REQUEST");
    assert!(response.body["detail"].is_string());
}

#[tokio::test]
async fn test_goals_are_scoped_to_session() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;

    for goal in ["first", "second"] {
        send(&app, "POST", "/api/goals", Some("alice"), Some(json!({ "goal_text": goal }))).await;
    }
    send(&app, "POST", "/api/goals", Some("bob"), Some(json!({ "goal_text": "bob's" }))).await;

    let alice = send(&app, "GET", "/api/goals", Some("alice"), None).await;
    assert_eq!(alice.status, StatusCode::OK);
    let goals = alice.body.as_array().unwrap();
    assert_eq!(goals.len(), 2);
    // Newest first
    assert_eq!(goals[0]["goal_text"], "second");
    assert_eq!(goals[1]["goal_text"], "first");

    let bob_id = send(&app, "GET", "/api/goals", Some("bob"), None).await.body[0]["id"].clone();
    let stolen = send(&app, "GET", &format!("/api/goals/{}", bob_id), Some("alice"), None).await;
    assert_eq!(stolen.status, StatusCode::NOT_FOUND);
    assert_eq!(stolen.body["detail"], "Goal not found");
}

#[tokio::test]
async fn test_list_without_cookie_starts_new_session() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;
    send(&app, "POST", "/api/goals", Some("alice"), Some(json!({ "goal_text": "mine" }))).await;

    let response = send(&app, "GET", "/api/goals", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
    let issued = response.session_id().expect("new session issued");
    assert_ne!(issued, "alice");
}

#[tokio::test]
async fn test_list_pagination() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;
    for i in 0..4 {
        let goal = format!("goal {}", i);
        send(&app, "POST", "/api/goals", Some("pager"), Some(json!({ "goal_text": goal }))).await;
    }

    let page = send(&app, "GET", "/api/goals?skip=1&limit=2", Some("pager"), None).await;
    let goals = page.body.as_array().unwrap();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[0]["goal_text"], "goal 2");
    assert_eq!(goals[1]["goal_text"], "goal 1");
}

#[tokio::test]
async fn test_get_and_delete_goal() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;
    let created = send(
        &app,
        "POST",
        "/api/goals",
        Some("owner"),
        Some(json!({ "goal_text": "Write a book" })),
    )
    .await;
    let id = created.body["id"].as_i64().unwrap();
    let uri = format!("/api/goals/{}", id);

    let fetched = send(&app, "GET", &uri, Some("owner"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);
    assert!(fetched.set_cookie.is_none());

    let other = send(&app, "DELETE", &uri, Some("intruder"), None).await;
    assert_eq!(other.status, StatusCode::NOT_FOUND);

    let deleted = send(&app, "DELETE", &uri, Some("owner"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Goal deleted successfully");

    let gone = send(&app, "GET", &uri, Some("owner"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["code"], "GOAL_NOT_FOUND");
}

#[tokio::test]
async fn test_service_info_and_health() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;

    let root = send(&app, "GET", "/", None, None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_contains(root.body["message"].as_str().unwrap(), "goal breaker");
    assert_eq!(root.body["endpoints"]["create_goal"], "POST /api/goals");

    let health = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["status"], "ok");
}

#[tokio::test]
async fn test_config_endpoint_reports_model() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;

    let response = send(&app, "GET", "/api/config", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["model"], "fake-model");
    assert!(response.body["provider"].is_string());
}

#[tokio::test]
async fn test_openapi_document_lists_goal_paths() {
    let app = test_app(FakeLlmClient::replying(VALID_PAYLOAD)).await;

    let response = send(&app, "GET", "/api/openapi.json", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"]["/api/goals"].is_object());
}
