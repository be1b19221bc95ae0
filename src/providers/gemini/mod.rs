use crate::core::error::ProviderError;
use crate::providers::LLMProvider;
use async_trait::async_trait;

mod client;
mod types;

use client::GeminiClient;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Clone)]
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_endpoint(DEFAULT_BASE_URL.to_string(), api_key, model)
    }

    pub fn with_endpoint(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            client: GeminiClient::new(endpoint, api_key, model),
        }
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate(&self, query: &str) -> Result<String, ProviderError> {
        self.client.generate_content(query).await
    }
}
