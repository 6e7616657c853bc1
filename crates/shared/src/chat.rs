use tracing::{error, info, warn};

use crate::history::HistoryStore;
use crate::llm::CompletionClient;
use crate::models::{AskResponse, ConversationHistory, ConversationTurn};

/// Result of one `ask` exchange. Failures are values, never panics or errors
/// past this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    Reply(String),
    Error(String),
}

impl From<AskOutcome> for AskResponse {
    fn from(outcome: AskOutcome) -> Self {
        match outcome {
            AskOutcome::Reply(reply) => AskResponse::Reply { reply },
            AskOutcome::Error(error) => AskResponse::Error { error },
        }
    }
}

#[derive(Clone)]
pub struct ChatService {
    completion: CompletionClient,
    history: HistoryStore,
}

impl ChatService {
    pub fn new(completion: CompletionClient, history: HistoryStore) -> Self {
        Self {
            completion,
            history,
        }
    }

    pub fn history_store(&self) -> &HistoryStore {
        &self.history
    }

    pub async fn get_history(&self) -> ConversationHistory {
        self.history.load().await
    }

    /// Completes `prompt` and records the exchange. A turn is persisted only
    /// after the completion succeeds, and the reply is only returned once the
    /// turn is on disk.
    pub async fn ask(&self, prompt: &str) -> AskOutcome {
        let reply = match self.completion.complete(prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "chat completion failed");
                return AskOutcome::Error(err.to_string());
            }
        };

        match self
            .history
            .append(ConversationTurn::new(prompt, reply.clone()))
            .await
        {
            Ok(history) => {
                info!(turns = history.len(), "chat turn recorded");
                AskOutcome::Reply(reply)
            }
            Err(err) => {
                error!(error = %err, "failed to persist chat turn");
                AskOutcome::Error(err.to_string())
            }
        }
    }
}
