use crate::llm::openrouter::OpenRouterClient;
use crate::llm::{ DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE };
use super::mock::{ generate_mock_response, last_user_message };

use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::{ get, post },
    Router,
    extract::State,
    response::{ IntoResponse, Response },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{ json, Value };
use tower_http::cors::{ Any, CorsLayer };
use tower_http::services::ServeDir;
use log::{ debug, error };

#[derive(Clone)]
pub enum Backend {
    Upstream(Arc<OpenRouterClient>),
    Mock,
}

impl Backend {
    fn mode(&self) -> &'static str {
        match self {
            Backend::Upstream(_) => "upstream",
            Backend::Mock => "mock",
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
    pub model: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
    mode: &'static str,
}

pub fn router(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .with_state(state)
}

fn error_response(code: StatusCode, message: String) -> Response {
    (code, Json(json!({ "error": message }))).into_response()
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid request: missing messages".into()
            );
        }
    };
    let Some(messages) = payload.get("messages") else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid request: missing messages".into());
    };

    match &state.backend {
        Backend::Mock => {
            let question = last_user_message(messages);
            debug!("Mock reply for: {}", question);
            Json(
                json!({
                    "choices": [
                        {
                            "message": {
                                "role": "assistant",
                                "content": generate_mock_response(&question)
                            }
                        }
                    ]
                })
            ).into_response()
        }
        Backend::Upstream(client) => {
            let temperature = payload
                .get("temperature")
                .and_then(Value::as_f64)
                .map(|t| t as f32)
                .unwrap_or(DEFAULT_TEMPERATURE);
            let max_tokens = payload
                .get("max_tokens")
                .and_then(Value::as_u64)
                .map(|t| t as u32)
                .unwrap_or(DEFAULT_MAX_TOKENS);

            match client.forward(messages, temperature, Some(max_tokens)).await {
                Ok(reply) => (reply.status, Json(reply.body)).into_response(),
                Err(e) => {
                    error!("Upstream request failed: {}", e);
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("Server error: {}", e))
                }
            }
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        model: state.model.clone(),
        mode: state.backend.mode(),
    })
}
