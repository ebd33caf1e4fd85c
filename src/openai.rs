//! OpenAI client configuration with sensible defaults.

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Create an OpenAI client with the default timeout.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client))
}

/// Whether `OPENAI_API_KEY` is set to a non-empty value.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|key| !key.trim().is_empty())
}
