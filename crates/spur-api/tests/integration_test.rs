use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::IntoResponse,
    Router,
};
use serde_json::{json, Value};
use spur_api::{build_router, config::Config, error::ApiError, state::AppState};
use spur_cache::{CacheStore, MemoryCache};
use spur_chat::{keys, ChatPolicy, PROVIDER_FAILURE_FALLBACK};
use spur_llm::{ChatClient, ChatRequest, ChatResponse};
use spur_persist::{LedgerStore, MemoryLedger, MessageRole};
use tower::ServiceExt;
use uuid::Uuid;

struct CannedClient;

#[async_trait]
impl ChatClient for CannedClient {
    async fn chat(&self, request: ChatRequest) -> anyhow::Result<ChatResponse> {
        Ok(ChatResponse::text(format!(
            "You said something after {} messages.",
            request.messages.len()
        )))
    }
}

struct DownClient;

#[async_trait]
impl ChatClient for DownClient {
    async fn chat(&self, _request: ChatRequest) -> anyhow::Result<ChatResponse> {
        anyhow::bail!("Gemini API error (503): overloaded")
    }
}

struct PanickingClient;

#[async_trait]
impl ChatClient for PanickingClient {
    async fn chat(&self, _request: ChatRequest) -> anyhow::Result<ChatResponse> {
        panic!("malformed candidate")
    }
}

struct TestApp {
    router: Router,
    ledger: Arc<MemoryLedger>,
    cache: Arc<MemoryCache>,
}

fn app_with(client: Arc<dyn ChatClient>, policy: ChatPolicy) -> TestApp {
    let ledger = Arc::new(MemoryLedger::new());
    let cache = Arc::new(MemoryCache::new());
    let config = Config {
        chat: policy,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config, ledger.clone(), cache.clone(), client));
    TestApp {
        router: build_router(state),
        ledger,
        cache,
    }
}

fn app() -> TestApp {
    app_with(Arc::new(CannedClient), ChatPolicy::default())
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_message(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat/message")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_reports_services() {
    let app = app();

    for uri in ["/", "/health"] {
        let (status, body) = send(&app.router, get(uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "Spur Chat Agent API");
        assert_eq!(body["services"]["ledger"], "connected");
        assert_eq!(body["services"]["cache"], "connected");
    }
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = app();

    let (status, body) = send(&app.router, get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/chat/message"].is_object());
    assert!(body["paths"]["/chat/history/{session_id}"].is_object());
}

#[tokio::test]
async fn test_conversation_round_trip() {
    let app = app();

    let (status, first) = send(
        &app.router,
        post_message(json!({ "message": "Do you ship to India?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let session_id = first["sessionId"].as_str().unwrap().to_string();
    assert!(Uuid::parse_str(&session_id).is_ok());
    assert_eq!(first["reply"], "You said something after 3 messages.");

    let (status, second) = send(
        &app.router,
        post_message(json!({ "message": "How much is it?", "sessionId": session_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["sessionId"], session_id.as_str());
    // preamble + ack + first exchange + new message
    assert_eq!(second["reply"], "You said something after 5 messages.");

    let (status, history) = send(&app.router, get(&format!("/chat/history/{}", session_id))).await;
    assert_eq!(status, StatusCode::OK);
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "ai");
    assert_eq!(messages[1]["content"], "How much is it?");
    assert_eq!(messages[3]["sessionId"], session_id.as_str());
    assert!(messages[3]["createdAt"].is_string());
    assert!(history.get("nextCursor").is_none());
}

#[tokio::test]
async fn test_invalid_messages_are_rejected() {
    let app = app();

    let cases = [
        json!({ "message": "" }),
        json!({ "message": "x".repeat(251) }),
        json!({ "sessionId": Uuid::new_v4().to_string() }),
        json!({ "message": "hi", "sessionId": "not-a-uuid" }),
        json!({ "message": 42 }),
    ];
    for case in cases {
        let (status, body) = send(&app.router, post_message(case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case {}", case);
        assert_eq!(body["error"], "Invalid input");
        assert!(body.get("details").is_some());
    }
    assert!(app.cache.is_empty().await);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/chat/message")
        .header("content-type", "application/json")
        .body(Body::from("{\"message\":"))
        .unwrap();

    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid input");
}

#[tokio::test]
async fn test_locked_session_gets_429() {
    let app = app();
    let session = Uuid::new_v4();
    app.cache
        .set_if_absent(
            &keys::turn_lock(session),
            keys::TURN_LOCKED,
            std::time::Duration::from_secs(30),
        )
        .await
        .unwrap();

    let (status, body) = send(
        &app.router,
        post_message(json!({ "message": "hello", "sessionId": session.to_string() })),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too Many Requests");
    assert_eq!(
        body["details"]["message"],
        "Previous message is still processing. Please wait."
    );
}

#[tokio::test]
async fn test_full_session_gets_403() {
    let app = app_with(
        Arc::new(CannedClient),
        ChatPolicy {
            max_messages_per_session: 2,
            ..ChatPolicy::default()
        },
    );
    let session = Uuid::new_v4().to_string();

    let (status, _) = send(
        &app.router,
        post_message(json!({ "message": "first", "sessionId": session })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        post_message(json!({ "message": "second", "sessionId": session })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({ "error": "Limit Reached", "details": "Conversation limit reached." }));
}

#[tokio::test]
async fn test_provider_outage_still_answers() {
    let app = app_with(Arc::new(DownClient), ChatPolicy::default());

    let (status, body) = send(&app.router, post_message(json!({ "message": "Hello" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], PROVIDER_FAILURE_FALLBACK);
    let session = Uuid::parse_str(body["sessionId"].as_str().unwrap()).unwrap();
    assert_eq!(app.ledger.count_messages(session).await.unwrap(), 2);
}

#[tokio::test]
async fn test_panicking_provider_still_answers() {
    let app = app_with(Arc::new(PanickingClient), ChatPolicy::default());
    let session = Uuid::new_v4();

    let (status, body) = send(
        &app.router,
        post_message(json!({ "message": "Hello", "sessionId": session.to_string() })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], PROVIDER_FAILURE_FALLBACK);
    assert_eq!(app.ledger.count_messages(session).await.unwrap(), 2);
    assert!(app.cache.get(&keys::turn_lock(session)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_history_pagination_over_http() {
    let app = app();
    let session = Uuid::new_v4();
    for i in 0..5 {
        app.ledger
            .create_message(session, MessageRole::User, &format!("m{}", i))
            .await
            .unwrap();
    }

    let mut uri = format!("/chat/history/{}?limit=2", session);
    let mut pages = Vec::new();
    loop {
        let (status, body) = send(&app.router, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        let contents: Vec<String> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap().to_string())
            .collect();
        pages.push(contents);
        match body["nextCursor"].as_str() {
            Some(cursor) => uri = format!("/chat/history/{}?limit=2&cursor={}", session, cursor),
            None => break,
        }
    }

    assert_eq!(pages, vec![vec!["m4", "m3"], vec!["m2", "m1"], vec!["m0"]]);
}

#[tokio::test]
async fn test_history_rejects_bad_parameters() {
    let app = app();
    let session = Uuid::new_v4();

    for uri in [
        "/chat/history/not-a-uuid".to_string(),
        format!("/chat/history/{}?limit=0", session),
        format!("/chat/history/{}?limit=101", session),
        format!("/chat/history/{}?limit=ten", session),
        format!("/chat/history/{}?cursor=abc", session),
    ] {
        let (status, body) = send(&app.router, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(body["error"], "Invalid parameters");
    }
}

#[tokio::test]
async fn test_internal_errors_hide_details() {
    let response = ApiError::Internal("connection reset by peer".to_string()).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}
