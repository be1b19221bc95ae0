//! Interaction history persistence.
//!
//! Every successful dispatch appends one [`InteractionRecord`]; records are
//! never updated or deleted. Reads only ever expose the `user_query` of each
//! record, newest first.

use crate::config::{ModelType, StorageBackend, StorageConfig};
use crate::core::error::StorageError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub mod memory;
pub mod mongo;

pub use memory::InMemoryHistoryStore;
pub use mongo::MongoHistoryStore;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_query: String,
    pub model_response: String,
    pub model_type: ModelType,
    #[serde(rename = "time")]
    pub timestamp: String,
}

impl InteractionRecord {
    /// Stamps the record with the local clock at second precision.
    pub fn new(model_type: ModelType, user_query: &str, model_response: &str) -> Self {
        Self {
            user_query: user_query.to_string(),
            model_response: model_response.to_string(),
            model_type,
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// The projection returned by [`HistoryStore::recent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub user_query: String,
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, record: &InteractionRecord) -> Result<(), StorageError>;

    /// At most `limit` entries, most recently inserted first.
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, StorageError>;
}

pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn HistoryStore>, StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory history store");
            Ok(Arc::new(InMemoryHistoryStore::new()))
        }
        StorageBackend::MongoDB => {
            let store = MongoHistoryStore::connect(config).await?;
            Ok(Arc::new(store))
        }
    }
}
