pub mod completion;
pub mod gateway;
pub mod gemini;

pub use completion::{CompletionClient, CompletionError, RetryPolicy, extract_reply_text};
pub use gateway::{LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayResponse};
pub use gemini::{
    API_KEY_ENV_VARS, DEFAULT_GEMINI_MODEL, GeminiGateway, GeminiGatewayBuildError,
    GeminiGatewayConfig,
};
