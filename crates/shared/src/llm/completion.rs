use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use super::gateway::LlmGateway;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(2);
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;

/// Attempt budget and backoff schedule for one completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Total number of provider calls allowed. Never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Delay slept before `attempt` (1-based). The first attempt is not
    /// delayed; attempt `k >= 2` waits `initial_backoff * multiplier^(k-2)`.
    pub fn backoff_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 2).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.powi(exponent);
        Duration::try_from_secs_f64(self.initial_backoff.as_secs_f64() * factor)
            .unwrap_or(self.initial_backoff)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error(
        "Generative AI API key not configured. Set GENAI_API_KEY or GOOGLE_API_KEY environment variable."
    )]
    NotConfigured,
    #[error("{0}")]
    UpstreamFailure(String),
}

/// Retrying wrapper around an [`LlmGateway`].
///
/// Each call runs its retry loop on a spawned tokio task and awaits the join
/// handle, so the calling task is free while provider calls and backoff
/// sleeps are in flight. There is no cancellation: once started, the loop runs
/// until success or exhaustion.
#[derive(Clone)]
pub struct CompletionClient {
    gateway: Arc<dyn LlmGateway>,
    policy: RetryPolicy,
}

impl CompletionClient {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.complete_with_policy(prompt, self.policy).await
    }

    pub async fn complete_with_policy(
        &self,
        prompt: &str,
        policy: RetryPolicy,
    ) -> Result<String, CompletionError> {
        if !self.gateway.is_configured() {
            return Err(CompletionError::NotConfigured);
        }

        let gateway = Arc::clone(&self.gateway);
        let prompt = prompt.to_string();
        let worker =
            tokio::spawn(async move { run_with_retries(gateway.as_ref(), &prompt, policy).await });

        match worker.await {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "completion worker did not finish");
                Err(CompletionError::UpstreamFailure(format!(
                    "completion worker failed: {err}"
                )))
            }
        }
    }
}

async fn run_with_retries(
    gateway: &dyn LlmGateway,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String, CompletionError> {
    let attempts = policy.attempts();
    let mut attempt = 1_u32;

    loop {
        match gateway.generate(prompt).await {
            Ok(response) => {
                debug!(attempt, model = %response.model, "completion succeeded");
                return Ok(extract_reply_text(&response.payload));
            }
            Err(err) if !err.is_retryable() => {
                warn!(attempt, error = %err, "completion failed permanently");
                return Err(CompletionError::UpstreamFailure(err.to_string()));
            }
            Err(err) if attempt >= attempts => {
                error!(attempt, error = %err, "completion retries exhausted");
                return Err(CompletionError::UpstreamFailure(err.to_string()));
            }
            Err(err) => {
                let backoff = policy.backoff_before_attempt(attempt + 1);
                warn!(
                    attempt,
                    backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "completion attempt failed; retrying"
                );
                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

/// Pulls the reply text out of a provider payload.
///
/// Gemini candidate parts are tried first, then top-level `text` and
/// `content` strings. Anything else is rendered whole.
pub fn extract_reply_text(payload: &Value) -> String {
    if let Some(text) = candidate_text(payload) {
        return text;
    }

    for key in ["text", "content"] {
        if let Some(text) = payload
            .get(key)
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
        {
            return text.to_string();
        }
    }

    match payload {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

fn candidate_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<String>();

    (!text.is_empty()).then_some(text)
}
