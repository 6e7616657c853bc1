use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::chat::ChatService;

mod chat;
mod health;
mod observability;

#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/chat", get(chat::get_chat_history))
        .route("/ask", post(chat::ask))
        .layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .with_state(app_state)
}
