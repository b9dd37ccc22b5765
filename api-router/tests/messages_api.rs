use std::sync::Arc;

use api_router::{api_routes, api_state::ApiState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use common::{
    storage::db::SurrealDbClient,
    utils::config::{AppConfig, ProfanityPolicy},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn test_app(policy: ProfanityPolicy) -> Router {
    let db = Arc::new(
        SurrealDbClient::memory("test_ns", &Uuid::new_v4().to_string())
            .await
            .expect("Failed to start in-memory surrealdb"),
    );
    db.apply_migrations()
        .await
        .expect("Failed to apply migrations");

    let config = AppConfig {
        profanity_policy: policy,
        ..Default::default()
    };

    api_routes().with_state(ApiState::with_db(db, config))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

async fn post_message(app: &Router, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/messages")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    send(app, request).await
}

fn message(id: &str, session: &str, sender: &str, timestamp: &str) -> Value {
    json!({
        "message_id": id,
        "session_id": session,
        "content": format!("message {id}"),
        "timestamp": timestamp,
        "sender": sender,
    })
}

#[tokio::test]
async fn test_create_message_returns_metadata() {
    let app = test_app(ProfanityPolicy::Reject).await;

    let (status, body) = post_message(
        &app,
        &json!({
            "message_id": "msg-1",
            "session_id": "s1",
            "content": "hi",
            "timestamp": "2023-06-15T14:30:00Z",
            "sender": "user"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["message_id"], "msg-1");
    assert_eq!(body["data"]["session_id"], "s1");
    assert_eq!(body["data"]["sender"], "user");
    assert_eq!(body["data"]["timestamp"], "2023-06-15T14:30:00Z");
    assert_eq!(body["data"]["metadata"]["word_count"], 1);
    assert_eq!(body["data"]["metadata"]["character_count"], 2);
    assert_eq!(body["data"]["metadata"]["is_filtered"], false);
    assert!(body["data"]["metadata"]["processed_at"].is_string());
}

#[tokio::test]
async fn test_unknown_sender_is_validation_error() {
    let app = test_app(ProfanityPolicy::Reject).await;

    let (status, body) = post_message(&app, &message("msg-1", "s1", "bot", "2023-06-15T14:30:00Z")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_field_is_named() {
    let app = test_app(ProfanityPolicy::Reject).await;

    let (status, body) = post_message(
        &app,
        &json!({
            "message_id": "msg-1",
            "content": "hello",
            "timestamp": "2023-06-15T14:30:00Z",
            "sender": "user"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("session_id"));
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = test_app(ProfanityPolicy::Reject).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/messages")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_future_timestamp_rejected() {
    let app = test_app(ProfanityPolicy::Reject).await;

    let (status, body) = post_message(&app, &message("msg-1", "s1", "user", "2999-01-01T00:00:00Z")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_duplicate_message_id_conflicts() {
    let app = test_app(ProfanityPolicy::Reject).await;
    let payload = message("msg-dup", "s1", "user", "2023-06-15T14:30:00Z");

    let (first, _) = post_message(&app, &payload).await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, body) = post_message(&app, &payload).await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_MESSAGE");

    let (_, listed) = get(&app, "/api/messages/s1").await;
    assert_eq!(listed["data"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_profanity_rejected_under_reject_policy() {
    let app = test_app(ProfanityPolicy::Reject).await;
    let mut payload = message("msg-1", "s1", "user", "2023-06-15T14:30:00Z");
    payload["content"] = json!("esto es ofensivo");

    let (status, body) = post_message(&app, &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_profanity_redacted_under_redact_policy() {
    let app = test_app(ProfanityPolicy::Redact).await;
    let mut payload = message("msg-1", "s1", "user", "2023-06-15T14:30:00Z");
    payload["content"] = json!("esto es Ofensivo");

    let (status, body) = post_message(&app, &payload).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["content"], "esto es ***");
    assert_eq!(body["data"]["metadata"]["is_filtered"], true);
}

#[tokio::test]
async fn test_list_paginates_newest_first() {
    let app = test_app(ProfanityPolicy::Reject).await;

    for i in 1..=5 {
        let ts = format!("2023-06-15T14:3{i}:00Z");
        let (status, _) = post_message(&app, &message(&format!("m{i}"), "s1", "user", &ts)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = get(&app, "/api/messages/s1?limit=2&skip=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["session_id"], "s1");
    let ids: Vec<&str> = body["data"]["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["message_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["m3", "m2"]);
    assert_eq!(body["data"]["pagination"]["skip"], 2);
    assert_eq!(body["data"]["pagination"]["limit"], 2);
    assert_eq!(body["data"]["pagination"]["total"], 5);
    assert_eq!(body["data"]["pagination"]["has_more"], true);

    let first = &body["data"]["messages"][0];
    assert_eq!(first["word_count"], 2);
    assert_eq!(first["character_count"], 10);
    assert_eq!(first["is_filtered"], false);
    assert!(first["processed_at"].is_string());
    assert!(first.get("metadata").is_none());

    let (_, last_page) = get(&app, "/api/messages/s1?limit=2&skip=4").await;
    assert_eq!(last_page["data"]["messages"].as_array().unwrap().len(), 1);
    assert_eq!(last_page["data"]["pagination"]["has_more"], false);
}

#[tokio::test]
async fn test_sender_filter_with_no_matches() {
    let app = test_app(ProfanityPolicy::Reject).await;
    let (status, _) = post_message(&app, &message("msg-1", "s1", "user", "2023-06-15T14:30:00Z")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&app, "/api/messages/s1?sender=system").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["messages"], json!([]));
    assert_eq!(body["data"]["pagination"]["total"], 0);
    assert_eq!(body["data"]["pagination"]["has_more"], false);
}

#[tokio::test]
async fn test_list_defaults() {
    let app = test_app(ProfanityPolicy::Reject).await;

    let (status, body) = get(&app, "/api/messages/empty-session").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["messages"], json!([]));
    assert_eq!(body["data"]["pagination"]["skip"], 0);
    assert_eq!(body["data"]["pagination"]["limit"], 100);
    assert_eq!(body["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_invalid_list_parameters() {
    let app = test_app(ProfanityPolicy::Reject).await;

    for uri in [
        "/api/messages/s1?sender=bot",
        "/api/messages/s1?limit=0",
        "/api/messages/s1?limit=1001",
        "/api/messages/s1?skip=-1",
        "/api/messages/s1?limit=abc",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "INVALID_PARAMETER", "{uri}");
    }
}

#[tokio::test]
async fn test_skip_past_signed_range_is_empty_page() {
    let app = test_app(ProfanityPolicy::Reject).await;
    let (status, _) = post_message(&app, &message("msg-1", "s1", "user", "2023-06-15T14:30:00Z")).await;
    assert_eq!(status, StatusCode::CREATED);

    for skip in ["9223372036854775808", "18446744073709551615"] {
        let (status, body) = get(&app, &format!("/api/messages/s1?skip={skip}")).await;
        assert_eq!(status, StatusCode::OK, "skip={skip}");
        assert_eq!(body["data"]["messages"], json!([]));
        assert_eq!(body["data"]["pagination"]["total"], 1);
        assert_eq!(body["data"]["pagination"]["has_more"], false);
    }
}

#[tokio::test]
async fn test_overlong_session_id_rejected() {
    let app = test_app(ProfanityPolicy::Reject).await;
    let session = "s".repeat(101);

    let (status, body) =
        post_message(&app, &message("msg-1", &session, "user", "2023-06-15T14:30:00Z")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("session_id"));
}

#[tokio::test]
async fn test_health_ready_and_index() {
    let app = test_app(ProfanityPolicy::Reject).await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "connected");

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");

    let (status, body) = get(&app, "/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "chat-message-api");
    assert!(body["version"].is_string());
    assert!(body["description"].is_string());
}
