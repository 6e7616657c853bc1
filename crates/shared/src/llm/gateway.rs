use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;

pub type LlmGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<LlmGatewayResponse, LlmGatewayError>> + Send + 'a>>;

/// Raw provider payload for a single successful call. Text extraction is left
/// to the caller so unrecognized shapes can still be rendered.
#[derive(Debug, Clone)]
pub struct LlmGatewayResponse {
    pub model: String,
    pub payload: Value,
}

/// Failure of a single provider call, tagged with whether another attempt may
/// succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmGatewayError {
    #[error("{0}")]
    Retryable(String),
    #[error("{0}")]
    Permanent(String),
}

impl LlmGatewayError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

pub trait LlmGateway: Send + Sync {
    /// Whether the gateway holds the credentials it needs to call out.
    fn is_configured(&self) -> bool;

    fn generate<'a>(&'a self, prompt: &'a str) -> LlmGatewayFuture<'a>;
}
