use crate::config::ModelType;
use crate::providers::LLMProvider;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ModelType, Arc<dyn LLMProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model_type: ModelType, provider: Arc<dyn LLMProvider>) {
        self.providers.insert(model_type, provider);
    }

    pub fn get(&self, model_type: ModelType) -> Option<Arc<dyn LLMProvider>> {
        self.providers.get(&model_type).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn model_types(&self) -> Vec<ModelType> {
        ModelType::ALL
            .into_iter()
            .filter(|m| self.providers.contains_key(m))
            .collect()
    }
}
