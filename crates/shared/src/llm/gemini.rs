use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::gateway::{LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayResponse};
use crate::config_env::first_present_env;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const API_KEY_ENV_VARS: [&str; 2] = ["GENAI_API_KEY", "GOOGLE_API_KEY"];
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiGatewayConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
}

impl GeminiGatewayConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Reads the credential from `GENAI_API_KEY`, falling back to
    /// `GOOGLE_API_KEY`. A missing credential is not an error here; calls
    /// fail later as not configured.
    pub fn from_env() -> Self {
        Self::new(first_present_env(&API_KEY_ENV_VARS))
    }

    fn endpoint_url(&self) -> Result<Url, GeminiGatewayBuildError> {
        let base = Url::parse(&self.base_url).map_err(|err| {
            GeminiGatewayBuildError::InvalidConfiguration(format!(
                "gemini base url is invalid: {err}"
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(GeminiGatewayBuildError::InvalidConfiguration(
                "gemini base url must start with http:// or https://".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(GeminiGatewayBuildError::InvalidConfiguration(
                "gemini model must not be empty".to_string(),
            ));
        }

        let joined = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model.trim()
        );
        Url::parse(&joined).map_err(|err| {
            GeminiGatewayBuildError::InvalidConfiguration(format!(
                "gemini endpoint url is invalid: {err}"
            ))
        })
    }
}

impl fmt::Debug for GeminiGatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiGatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum GeminiGatewayBuildError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build Gemini http client: {0}")]
    HttpClient(String),
}

#[derive(Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    endpoint: Url,
    config: GeminiGatewayConfig,
}

impl GeminiGateway {
    pub fn new(config: GeminiGatewayConfig) -> Result<Self, GeminiGatewayBuildError> {
        let endpoint = config.endpoint_url()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| GeminiGatewayBuildError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    // Every failure is tagged retryable for now; narrowing the policy only
    // needs to change the tags produced here.
    async fn send_once(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> Result<LlmGatewayResponse, LlmGatewayError> {
        let request_body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LlmGatewayError::Retryable("gemini request timed out".to_string())
                } else {
                    LlmGatewayError::Retryable(format!("gemini request failed: {err}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            LlmGatewayError::Retryable(format!("gemini response body read failed: {err}"))
        })?;

        if !status.is_success() {
            return Err(LlmGatewayError::Retryable(format!(
                "gemini returned status={} message={}",
                status.as_u16(),
                parse_provider_error_message(&body)
            )));
        }

        let payload = serde_json::from_str::<Value>(&body).map_err(|_| {
            LlmGatewayError::Retryable("gemini response was not valid JSON".to_string())
        })?;

        debug!(model = %self.config.model, status = status.as_u16(), "gemini call completed");

        Ok(LlmGatewayResponse {
            model: payload
                .get("modelVersion")
                .and_then(Value::as_str)
                .unwrap_or(&self.config.model)
                .to_string(),
            payload,
        })
    }
}

impl LlmGateway for GeminiGateway {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn generate<'a>(&'a self, prompt: &'a str) -> LlmGatewayFuture<'a> {
        Box::pin(async move {
            let Some(api_key) = self.config.api_key.as_deref() else {
                return Err(LlmGatewayError::Permanent(
                    "gemini api key is not configured".to_string(),
                ));
            };
            self.send_once(api_key, prompt).await
        })
    }
}

fn parse_provider_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        message: Option<String>,
        status: Option<String>,
    }

    let Some(details) = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
    else {
        return "unknown".to_string();
    };

    match (details.status, details.message) {
        (Some(status), Some(message)) => format!("{status}: {message}"),
        (None, Some(message)) => message,
        (Some(status), None) => status,
        (None, None) => "unknown".to_string(),
    }
}
