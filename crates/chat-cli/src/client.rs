use std::time::Duration;

use shared::models::{AskRequest, AskResponse, ConversationHistory};
use thiserror::Error;
use url::Url;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} returned an unreadable body: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// HTTP client for the chat backend's `/chat` and `/ask` routes.
#[derive(Clone)]
pub struct ChatApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChatApiClient {
    pub fn new(base_url: &Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub async fn history(&self) -> Result<ConversationHistory, ClientError> {
        let url = format!("{}/chat", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(url, response).await
    }

    pub async fn ask(&self, prompt: &str) -> Result<AskResponse, ClientError> {
        let url = format!("{}/ask", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&AskRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode(url, response).await
    }
}

async fn decode<T>(url: String, response: reqwest::Response) -> Result<T, ClientError>
where
    T: serde::de::DeserializeOwned,
{
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            url,
            status: status.as_u16(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|source| ClientError::Decode { url, source })
}
