use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub api_url: Url,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("missing value for argument: {0}")]
    MissingValue(String),
    #[error("invalid api url {0}: must be an absolute http:// or https:// url")]
    InvalidApiUrl(String),
    #[error("help requested")]
    HelpRequested,
}

impl CliOptions {
    /// Parses arguments; `env_api_url` is used when `--api-url` is absent.
    pub fn parse<I>(args: I, env_api_url: Option<String>) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut api_url = None;

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(CliError::HelpRequested),
                "--api-url" => {
                    let value = iter.next().ok_or(CliError::MissingValue(arg.clone()))?;
                    api_url = Some(value);
                }
                unknown => return Err(CliError::UnknownArgument(unknown.to_string())),
            }
        }

        let raw = api_url
            .or(env_api_url.filter(|value| !value.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: parse_api_url(raw.trim())?,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, CliError> {
    let url = Url::parse(raw).map_err(|_| CliError::InvalidApiUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CliError::InvalidApiUrl(raw.to_string()));
    }
    Ok(url)
}
