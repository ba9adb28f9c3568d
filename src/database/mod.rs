pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;

use crate::config::{Config, StoreBackend};
use crate::utils::error::{AppError, AppResult};

pub use memory::MemoryStore;
pub use mongo::MongoStore;

pub const USERS: &str = "users";
pub const SURVEYS: &str = "surveys";
pub const VOTES: &str = "votes";
pub const REPORTS: &str = "reports";
pub const COMMENTS: &str = "comments";
pub const PAYMENTS: &str = "payments";

/// Result of a conditional insert guarded by a unique key.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(ObjectId),
    Duplicate,
}

/// Acknowledgement of an update, shaped like the driver's `UpdateResult`.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}

/// Sort over a single field. `1` ascending, `-1` descending.
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub direction: i32,
}

impl SortSpec {
    pub fn ascending(field: &str) -> Self {
        Self { field: field.to_string(), direction: 1 }
    }

    pub fn descending(field: &str) -> Self {
        Self { field: field.to_string(), direction: -1 }
    }
}

/// Minimal document store the services are written against.
///
/// Filters are equality matches on top-level fields. `insert_unique` must be a single
/// atomic conditional write: two racing callers with the same key never both insert.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: &str, doc: Document) -> AppResult<ObjectId>;

    /// Inserts `doc` unless a document matching `key` already exists.
    async fn insert_unique(
        &self,
        collection: &str,
        key: Document,
        doc: Document,
    ) -> AppResult<InsertOutcome>;

    async fn find_one(&self, collection: &str, filter: Document) -> AppResult<Option<Document>>;

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<SortSpec>,
    ) -> AppResult<Vec<Document>>;

    /// `$set` of `fields` on the first match. With `upsert`, a missing match is created
    /// from `filter` merged with `fields`.
    async fn set_fields(
        &self,
        collection: &str,
        filter: Document,
        fields: Document,
        upsert: bool,
    ) -> AppResult<UpdateAck>;

    async fn increment(
        &self,
        collection: &str,
        filter: Document,
        field: &str,
        delta: i64,
    ) -> AppResult<UpdateAck>;

    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<u64>;

    async fn count(&self, collection: &str, filter: Document) -> AppResult<u64>;

    async fn ping(&self) -> AppResult<()>;

    /// Releases pooled connections. Called once after the HTTP server stops.
    async fn shutdown(&self) {}
}

/// Process-wide store handle, created once at startup and shared through `web::Data`.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
}

impl Database {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn connect(config: &Config) -> AppResult<Self> {
        match config.store_backend {
            StoreBackend::Memory => {
                log::warn!("⚠️  Using in-memory store, data is lost on restart");
                Ok(Self::in_memory())
            }
            StoreBackend::MongoDB => {
                let url = config
                    .database_url
                    .as_deref()
                    .ok_or_else(|| AppError::Database("DATABASE_URL not configured".to_string()))?;
                let store = MongoStore::new(url, &config.database_name).await?;
                Ok(Self::new(Arc::new(store)))
            }
        }
    }
}

impl Deref for Database {
    type Target = dyn DocumentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

/// Parses a path id into an `ObjectId`, rejecting malformed ids as a client error.
pub fn parse_object_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest(format!("Invalid id: {}", id)))
}

/// Turns a stored document into response JSON, with `_id` rendered as a plain hex string.
pub fn to_json(doc: Document) -> serde_json::Value {
    let mut doc = doc;
    if let Ok(id) = doc.get_object_id("_id") {
        doc.insert("_id", id.to_hex());
    }
    Bson::Document(doc).into_relaxed_extjson()
}

pub fn to_json_list(docs: Vec<Document>) -> serde_json::Value {
    serde_json::Value::Array(docs.into_iter().map(to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_to_json_flattens_object_id() {
        let id = ObjectId::new();
        let json = to_json(doc! { "_id": id, "category": "tech", "report": 0 });

        assert_eq!(json["_id"], id.to_hex());
        assert_eq!(json["category"], "tech");
        assert_eq!(json["report"], 0);
    }

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        assert!(matches!(parse_object_id("not-an-id"), Err(AppError::InvalidRequest(_))));
        assert!(parse_object_id(&ObjectId::new().to_hex()).is_ok());
    }
}
