use super::{HistoryEntry, HistoryStore, InteractionRecord};
use crate::core::error::StorageError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<RwLock<Vec<InteractionRecord>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record in insertion order.
    #[cfg(test)]
    pub async fn records(&self) -> Vec<InteractionRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, record: &InteractionRecord) -> Result<(), StorageError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, StorageError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .take(limit)
            .map(|r| HistoryEntry {
                user_query: r.user_query.clone(),
            })
            .collect())
    }
}
