use crate::config::{Config, ModelType, ProviderConfig};
use crate::core::error::RelayError;
use crate::dispatch::registry::ProviderRegistry;
use crate::providers::{LLMProvider, gemini, gemini::GeminiProvider, openai, openai::OpenAIProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

type ProviderCreator = Box<dyn Fn(&ProviderConfig, String) -> Arc<dyn LLMProvider> + Send + Sync>;

pub struct ProviderFactory {
    creators: HashMap<ModelType, ProviderCreator>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        let mut creators = HashMap::new();

        creators.insert(
            ModelType::OpenAI,
            Box::new(|config: &ProviderConfig, api_key: String| {
                let model = config
                    .model
                    .clone()
                    .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string());
                let provider = if let Some(base_url) = &config.base_url {
                    OpenAIProvider::with_endpoint(base_url.clone(), api_key, model)
                } else {
                    OpenAIProvider::new(api_key, model)
                };
                Arc::new(provider) as Arc<dyn LLMProvider>
            }) as ProviderCreator,
        );

        creators.insert(
            ModelType::Gemini,
            Box::new(|config: &ProviderConfig, api_key: String| {
                let model = config
                    .model
                    .clone()
                    .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());
                let provider = if let Some(base_url) = &config.base_url {
                    GeminiProvider::with_endpoint(base_url.clone(), api_key, model)
                } else {
                    GeminiProvider::new(api_key, model)
                };
                Arc::new(provider) as Arc<dyn LLMProvider>
            }) as ProviderCreator,
        );

        Self { creators }
    }

    pub fn create(
        &self,
        model_type: ModelType,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn LLMProvider>, RelayError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                RelayError::Config(format!(
                    "{} must be set in config or environment",
                    model_type.api_key_env()
                ))
            })?;

        self.creators
            .get(&model_type)
            .map(|creator| creator(config, api_key))
            .ok_or_else(|| RelayError::Config(format!("Provider not found: {}", model_type)))
    }

    /// Builds every provider that has credentials; the rest stay unregistered.
    pub fn build_registry(&self, config: &Config) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();

        for model_type in ModelType::ALL {
            match self.create(model_type, &config.provider(model_type)) {
                Ok(provider) => {
                    info!("Registered provider: {}", model_type);
                    registry.register(model_type, provider);
                }
                Err(e) => {
                    warn!("Skipping provider {}: {}", model_type, e);
                }
            }
        }

        if registry.is_empty() {
            warn!("No providers configured - every query will be rejected");
        }

        registry
    }
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}
