use super::{HistoryEntry, HistoryStore, InteractionRecord};
use crate::config::StorageConfig;
use crate::core::error::StorageError;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::{Client, Collection};
use tracing::info;

/// History backed by a MongoDB collection.
///
/// Ordering relies on `_id` being a driver-generated ObjectId, whose leading
/// bytes are the insertion time, so `_id: -1` sorts newest first.
#[derive(Clone)]
pub struct MongoHistoryStore {
    collection: Collection<InteractionRecord>,
}

impl MongoHistoryStore {
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let uri = required(&config.uri, "uri")?;
        let database = required(&config.database, "database")?;
        let collection = required(&config.collection, "collection")?;

        // Parses the URI and starts monitoring; no round-trip happens here.
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        info!(database, collection, "Using MongoDB history store");
        Ok(Self::from_client(&client, database, collection))
    }

    pub fn from_client(client: &Client, database: &str, collection: &str) -> Self {
        Self {
            collection: client.database(database).collection(collection),
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, StorageError> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| StorageError::Connection(format!("storage.{} is not configured", name)))
}

/// Unreachable hosts and rejected credentials are connection failures; the
/// rest are attributed to the operation that raised them.
fn classify(err: MongoError, operation: fn(String) -> StorageError) -> StorageError {
    match *err.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Authentication { .. } | ErrorKind::Io(_) => {
            StorageError::Connection(err.to_string())
        }
        _ => operation(err.to_string()),
    }
}

#[async_trait]
impl HistoryStore for MongoHistoryStore {
    async fn append(&self, record: &InteractionRecord) -> Result<(), StorageError> {
        self.collection
            .insert_one(record)
            .await
            .map_err(|e| classify(e, StorageError::Write))?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, StorageError> {
        // A zero limit means "no limit" to the server
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let cursor = self
            .collection
            .clone_with_type::<HistoryEntry>()
            .find(doc! {})
            .projection(doc! { "_id": 0, "user_query": 1 })
            .sort(doc! { "_id": -1 })
            .limit(limit)
            .await
            .map_err(|e| classify(e, StorageError::Read))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| classify(e, StorageError::Read))
    }
}
