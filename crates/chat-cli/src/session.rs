use shared::models::{AskResponse, ConversationHistory};

use crate::client::ClientError;

const EXIT_WORDS: [&str; 3] = ["bye", "exit", "quit"];

#[derive(Debug, PartialEq, Eq)]
pub enum InputAction {
    Skip,
    Exit,
    Send(String),
}

pub fn classify_input(line: &str) -> InputAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputAction::Skip;
    }
    if EXIT_WORDS.contains(&trimmed.to_lowercase().as_str()) {
        return InputAction::Exit;
    }
    InputAction::Send(trimmed.to_string())
}

pub fn user_line(text: &str) -> String {
    format!("You: {text}")
}

pub fn assistant_line(text: &str) -> String {
    format!("Assistant: {text}")
}

/// Errors are shown in the assistant's slot so the conversation reads
/// linearly.
pub fn error_line(message: &str) -> String {
    assistant_line(&format!("Error: {message}"))
}

pub fn render_history(history: &ConversationHistory) -> Vec<String> {
    history
        .turns()
        .iter()
        .flat_map(|turn| [user_line(turn.prompt()), assistant_line(turn.reply())])
        .collect()
}

pub fn render_history_error(err: &ClientError) -> String {
    error_line(&format!("could not load chat history: {err}"))
}

pub fn render_ask(result: Result<AskResponse, ClientError>) -> String {
    match result {
        Ok(AskResponse::Reply { reply }) => assistant_line(&reply),
        Ok(AskResponse::Error { error }) => error_line(&error),
        Err(err) => error_line(&err.to_string()),
    }
}
