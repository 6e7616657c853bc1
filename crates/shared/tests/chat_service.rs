use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use shared::chat::{AskOutcome, ChatService};
use shared::history::HistoryStore;
use shared::llm::{
    CompletionClient, LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayResponse,
    RetryPolicy,
};
use shared::models::ConversationTurn;
use tempfile::TempDir;
use tokio::sync::Mutex;

#[derive(Clone)]
struct ScriptedGateway {
    configured: bool,
    replies: Arc<Mutex<VecDeque<Result<Value, LlmGatewayError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGateway {
    fn new(configured: bool, replies: Vec<Result<Value, LlmGatewayError>>) -> Self {
        Self {
            configured,
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
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
                .unwrap_or_else(|| Err(LlmGatewayError::Retryable("no reply".to_string())))
                .map(|payload| LlmGatewayResponse {
                    model: "scripted".to_string(),
                    payload,
                })
        })
    }
}

fn service_for(gateway: &ScriptedGateway, dir: &TempDir) -> ChatService {
    let completion = CompletionClient::new(Arc::new(gateway.clone())).with_policy(RetryPolicy {
        max_retries: 3,
        initial_backoff: Duration::ZERO,
        backoff_multiplier: 1.5,
    });
    ChatService::new(
        completion,
        HistoryStore::new(dir.path().join("chat_history.json")),
    )
}

fn text_reply(text: &str) -> Result<Value, LlmGatewayError> {
    Ok(json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }))
}

#[tokio::test]
async fn successful_ask_returns_reply_and_appends_one_turn() {
    let dir = TempDir::new().expect("temp dir should create");
    let gateway = ScriptedGateway::new(true, vec![text_reply("hi there")]);
    let service = service_for(&gateway, &dir);

    let outcome = service.ask("hello").await;

    assert_eq!(outcome, AskOutcome::Reply("hi there".to_string()));
    let history = service.get_history().await;
    assert_eq!(history.turns(), &[ConversationTurn::new("hello", "hi there")]);
    assert_eq!(gateway.prompts.lock().await.clone(), vec!["hello".to_string()]);
}

#[tokio::test]
async fn exhausted_retries_return_error_and_leave_history_untouched() {
    let dir = TempDir::new().expect("temp dir should create");
    let gateway = ScriptedGateway::new(
        true,
        vec![
            text_reply("earlier"),
            Err(LlmGatewayError::Retryable("one".to_string())),
            Err(LlmGatewayError::Retryable("two".to_string())),
            Err(LlmGatewayError::Retryable("three".to_string())),
        ],
    );
    let service = service_for(&gateway, &dir);

    assert_eq!(
        service.ask("first").await,
        AskOutcome::Reply("earlier".to_string())
    );
    let before = service.get_history().await;

    let outcome = service.ask("second").await;

    assert_eq!(outcome, AskOutcome::Error("three".to_string()));
    assert_eq!(service.get_history().await, before);
    assert_eq!(gateway.prompts.lock().await.len(), 4);
}

#[tokio::test]
async fn not_configured_is_reported_in_band() {
    let dir = TempDir::new().expect("temp dir should create");
    let gateway = ScriptedGateway::new(false, vec![text_reply("unused")]);
    let service = service_for(&gateway, &dir);

    let AskOutcome::Error(message) = service.ask("hello").await else {
        panic!("unconfigured service should not produce a reply");
    };

    assert!(message.contains("not configured"), "got {message}");
    assert!(gateway.prompts.lock().await.is_empty());
    assert!(service.get_history().await.is_empty());
    assert!(!service.history_store().path().exists());
}

#[tokio::test]
async fn history_from_absent_storage_is_empty() {
    let dir = TempDir::new().expect("temp dir should create");
    let gateway = ScriptedGateway::new(true, Vec::new());
    let service = service_for(&gateway, &dir);

    assert!(service.get_history().await.is_empty());
}

#[tokio::test]
async fn each_ask_reloads_history_before_appending() {
    let dir = TempDir::new().expect("temp dir should create");
    let gateway = ScriptedGateway::new(true, vec![text_reply("one"), text_reply("two")]);
    let service = service_for(&gateway, &dir);

    service.ask("first").await;
    HistoryStore::new(service.history_store().path())
        .append(ConversationTurn::new("written elsewhere", "external"))
        .await
        .expect("external append should succeed");
    service.ask("second").await;

    let prompts = service
        .get_history()
        .await
        .turns()
        .iter()
        .map(|turn| turn.prompt().to_string())
        .collect::<Vec<_>>();
    assert_eq!(prompts, vec!["first", "written elsewhere", "second"]);
}

#[tokio::test]
async fn storage_failure_after_completion_is_reported_without_reply() {
    let dir = TempDir::new().expect("temp dir should create");
    let blocker = dir.path().join("not-a-directory");
    tokio::fs::write(&blocker, "file")
        .await
        .expect("fixture should write");

    let gateway = ScriptedGateway::new(true, vec![text_reply("hi")]);
    let completion = CompletionClient::new(Arc::new(gateway.clone()));
    let service = ChatService::new(completion, HistoryStore::new(blocker.join("history.json")));

    let outcome = service.ask("hello").await;

    assert!(
        matches!(outcome, AskOutcome::Error(ref message) if message.contains("failed to write chat history")),
        "got {outcome:?}"
    );
}
