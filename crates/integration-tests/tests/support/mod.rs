#![allow(dead_code)]

pub mod api_app;

use std::collections::VecDeque;
use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use shared::llm::{LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayResponse};
use tokio::sync::Mutex;
use tower::ServiceExt;

/// Provider double that replays queued payloads and records every prompt it
/// receives.
#[derive(Clone)]
pub struct ScriptedGateway {
    configured: bool,
    replies: Arc<Mutex<VecDeque<Result<Value, LlmGatewayError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGateway {
    pub fn configured(replies: Vec<Result<Value, LlmGatewayError>>) -> Self {
        Self {
            configured: true,
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::configured(Vec::new())
        }
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

impl LlmGateway for ScriptedGateway {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn generate<'a>(&'a self, prompt: &'a str) -> LlmGatewayFuture<'a> {
        Box::pin(async move {
            self.prompts.lock().await.push(prompt.to_string());
            self.replies
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| {
                    Err(LlmGatewayError::Retryable(
                        "exhausted scripted replies".to_string(),
                    ))
                })
                .map(|payload| LlmGatewayResponse {
                    model: "scripted-model".to_string(),
                    payload,
                })
        })
    }
}

pub fn gemini_text(text: &str) -> Result<Value, LlmGatewayError> {
    Ok(json!({
        "candidates": [
            {
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }
        ]
    }))
}

pub fn transient(message: &str) -> Result<Value, LlmGatewayError> {
    Err(LlmGatewayError::Retryable(message.to_string()))
}

pub struct JsonResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub async fn send_json(app: &axum::Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse { status, body }
}

pub fn request(method: Method, path: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::ACCEPT, "application/json");

    let request_body = body
        .map(|value| {
            serde_json::to_vec(&value).expect("json body should serialize for integration request")
        })
        .unwrap_or_default();
    if !request_body.is_empty() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }

    builder
        .body(Body::from(request_body))
        .expect("integration request should build")
}
