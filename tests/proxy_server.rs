use axum::{
    body::{ to_bytes, Body },
    extract::State,
    http::{ header::{ AUTHORIZATION, CONTENT_TYPE }, HeaderMap, Request, StatusCode },
    response::{ IntoResponse, Response },
    routing::post,
    Json,
    Router,
};
use relay_chat::coordinator::RequestCoordinator;
use relay_chat::history::ConversationStore;
use relay_chat::llm::openrouter::OpenRouterClient;
use relay_chat::llm::proxy::ProxyClient;
use relay_chat::server::api::{ router, AppState, Backend };
use serde_json::{ json, Value };
use std::sync::{ Arc, Mutex };
use tokio::net::TcpListener;
use tower::ServiceExt;

const MODEL: &str = "test/model";

fn mock_state() -> AppState {
    AppState { backend: Backend::Mock, model: MODEL.to_string() }
}

fn post_chat(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn mock_mode_answers_in_completion_shape() {
    let app = router(mock_state(), ".");
    let resp = app
        .oneshot(post_chat(r#"{"messages":[{"role":"user","content":"hello"}]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "Hello! I'm DeepSeek, an AI assistant. How can I help you today?"
    );
}

#[tokio::test]
async fn missing_messages_is_bad_request() {
    for body in [r#"{"temperature":0.7}"#, "not json", ""] {
        let resp = router(mock_state(), ".").oneshot(post_chat(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await, json!({ "error": "Invalid request: missing messages" }));
    }
}

#[tokio::test]
async fn health_reports_model_and_mode() {
    let resp = router(mock_state(), ".")
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "status": "healthy", "model": MODEL, "mode": "mock" }));
}

#[tokio::test]
async fn static_files_are_served_from_directory() {
    let dir = std::env::temp_dir().join(format!("relay-chat-static-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>chat</h1>").unwrap();

    let resp = router(mock_state(), dir.to_str().unwrap())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<h1>chat</h1>");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn coordinator_talks_to_mock_proxy_end_to_end() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(mock_state(), ".");
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = Arc::new(ProxyClient::new(&format!("http://{}/api/chat", addr)).unwrap());
    let coordinator = RequestCoordinator::new(client, ConversationStore::default());

    let reply = coordinator.submit("what is 2+2").await.unwrap();
    assert_eq!(reply, "2 + 2 equals 4. This is a basic arithmetic operation.");
    assert_eq!(coordinator.snapshot().len(), 3);
}

/// Records what the proxy forwards upstream.
#[derive(Clone, Default)]
struct Upstream {
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    status: Option<u16>,
}

async fn upstream_handler(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Json(payload): Json<Value>
) -> Response {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    upstream.seen.lock().unwrap().push((auth, payload));

    match upstream.status {
        Some(code) => {
            let status = StatusCode::from_u16(code).unwrap();
            (status, Json(json!({ "error": "slow down" }))).into_response()
        }
        None => Json(json!({ "choices": [{ "message": { "role": "assistant", "content": "from upstream" } }] })).into_response(),
    }
}

async fn spawn_upstream(upstream: Upstream) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(upstream_handler))
        .with_state(upstream);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1/chat/completions", addr)
}

fn upstream_state(url: String) -> AppState {
    let client = OpenRouterClient::new("sk-test", Some(MODEL.to_string()), Some(url)).unwrap();
    AppState { backend: Backend::Upstream(Arc::new(client)), model: MODEL.to_string() }
}

#[tokio::test]
async fn upstream_mode_forwards_transcript_with_credentials() {
    let upstream = Upstream::default();
    let url = spawn_upstream(upstream.clone()).await;

    let resp = router(upstream_state(url), ".")
        .oneshot(
            post_chat(
                r#"{"messages":[{"role":"system","content":"s"},{"role":"user","content":"hi"}],"temperature":0.2,"max_tokens":50}"#
            )
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["choices"][0]["message"]["content"], "from upstream");

    let seen = upstream.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (auth, payload) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(payload["model"], MODEL);
    assert_eq!(payload["messages"][1]["content"], "hi");
    assert!((payload["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    assert_eq!(payload["max_tokens"], 50);
}

#[tokio::test]
async fn upstream_defaults_sampling_parameters() {
    let upstream = Upstream::default();
    let url = spawn_upstream(upstream.clone()).await;

    router(upstream_state(url), ".")
        .oneshot(post_chat(r#"{"messages":[{"role":"user","content":"hi"}]}"#))
        .await
        .unwrap();

    let seen = upstream.seen.lock().unwrap();
    let payload = &seen[0].1;
    assert!((payload["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(payload["max_tokens"], 1000);
}

#[tokio::test]
async fn upstream_failure_status_is_relayed() {
    let upstream = Upstream { status: Some(429), ..Default::default() };
    let url = spawn_upstream(upstream).await;

    let resp = router(upstream_state(url), ".")
        .oneshot(post_chat(r#"{"messages":[{"role":"user","content":"hi"}]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(resp).await, json!({ "error": "slow down" }));
}

#[tokio::test]
async fn unreachable_upstream_is_server_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let resp = router(upstream_state(format!("http://{}/v1/chat/completions", addr)), ".")
        .oneshot(post_chat(r#"{"messages":[]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Server error: "));
}
