use crate::core::error::ProviderError;
use async_trait::async_trait;

/// Sampling temperature sent with every generation request
pub const TEMPERATURE: f32 = 0.5;

/// A text-generation backend reachable over the network.
///
/// Implementations hold only configuration and an HTTP client; every call is
/// authenticated and billed by the provider on its own, so callers pay one
/// round-trip per `generate`.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn generate(&self, query: &str) -> Result<String, ProviderError>;
}

pub mod base_client;
pub mod factory;
pub mod gemini;
pub mod openai;
