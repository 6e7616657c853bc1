use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use shared::models::{AskRequest, AskResponse};

use super::AppState;

pub(super) async fn get_chat_history(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.chat.get_history().await))
}

// Completion and storage failures come back as 200 with an `error` field.
pub(super) async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let outcome = state.chat.ask(&req.prompt).await;
    (StatusCode::OK, Json(AskResponse::from(outcome)))
}
