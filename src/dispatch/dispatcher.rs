use super::registry::ProviderRegistry;
use crate::config::{ModelType, TimeoutConfig};
use crate::core::error::{DispatchError, ProviderError, StorageError};
use crate::history::{HistoryEntry, HistoryStore, InteractionRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

pub type DispatchResult = Result<String, DispatchError>;

/// Routes a query to the provider named by its tag and records the exchange.
///
/// Holds no per-call state, so one instance is built at startup and cloned
/// into every request handler.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn HistoryStore>,
    provider_timeout: Duration,
    storage_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        registry: ProviderRegistry,
        store: Arc<dyn HistoryStore>,
        timeouts: &TimeoutConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
            provider_timeout: timeouts.provider(),
            storage_timeout: timeouts.storage(),
        }
    }

    #[cfg(test)]
    pub fn with_timeouts(mut self, provider: Duration, storage: Duration) -> Self {
        self.provider_timeout = provider;
        self.storage_timeout = storage;
        self
    }

    /// Generates a reply with the selected provider, then appends one record.
    ///
    /// Nothing is written when the tag is unknown, the provider has no key, or
    /// the provider fails.
    pub async fn dispatch(&self, model_type: &str, user_query: &str) -> DispatchResult {
        let model_type = ModelType::from_tag(model_type)
            .ok_or_else(|| DispatchError::UnknownModelType(model_type.to_string()))?;
        let provider = self.registry.get(model_type).ok_or_else(|| {
            ProviderError::Authentication(format!(
                "{} is not configured",
                model_type.api_key_env()
            ))
        })?;

        debug!(%model_type, "Dispatching query");

        let response = timeout(self.provider_timeout, provider.generate(user_query))
            .await
            .map_err(|_| ProviderError::Timeout(self.provider_timeout))??;

        self.persist(InteractionRecord::new(model_type, user_query, &response))
            .await?;

        debug!(%model_type, "Interaction recorded");
        Ok(response)
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, DispatchError> {
        let entries = timeout(self.storage_timeout, self.store.recent(limit))
            .await
            .map_err(|_| StorageError::Timeout(self.storage_timeout))??;
        Ok(entries)
    }

    async fn persist(&self, record: InteractionRecord) -> Result<(), StorageError> {
        let store = Arc::clone(&self.store);
        let limit = self.storage_timeout;

        // Runs on its own task so the write finishes even if the caller is dropped
        let write = tokio::spawn(async move {
            timeout(limit, store.append(&record))
                .await
                .map_err(|_| StorageError::Timeout(limit))?
        });

        write
            .await
            .map_err(|e| StorageError::Write(format!("write task failed: {}", e)))?
    }
}
