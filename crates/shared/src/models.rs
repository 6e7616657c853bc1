use serde::{Deserialize, Serialize};

/// One completed prompt/reply exchange. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    prompt: String,
    reply: String,
}

impl ConversationTurn {
    pub fn new(prompt: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reply: reply.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }
}

/// Chronologically ordered turns. Serializes as the `GET /chat` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHistory {
    messages: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.messages
    }

    pub fn into_turns(self) -> Vec<ConversationTurn> {
        self.messages
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.messages.push(turn);
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<Vec<ConversationTurn>> for ConversationHistory {
    fn from(messages: Vec<ConversationTurn>) -> Self {
        Self { messages }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
}

/// `POST /ask` body. Failures travel in-band under `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AskResponse {
    Reply { reply: String },
    Error { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}
