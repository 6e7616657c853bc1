use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use api_server::http::{AppState, build_router};
use shared::chat::ChatService;
use shared::history::HistoryStore;
use shared::llm::{CompletionClient, RetryPolicy};

use super::ScriptedGateway;

pub const TEST_MAX_RETRIES: u32 = 3;

pub fn build_test_router(gateway: &ScriptedGateway, history_path: &Path) -> axum::Router {
    let completion =
        CompletionClient::new(Arc::new(gateway.clone())).with_policy(RetryPolicy {
            max_retries: TEST_MAX_RETRIES,
            initial_backoff: Duration::ZERO,
            backoff_multiplier: 1.5,
        });

    build_router(AppState {
        chat: ChatService::new(completion, HistoryStore::new(history_path)),
    })
}
