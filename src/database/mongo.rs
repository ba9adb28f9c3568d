use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

use super::{
    DocumentStore, InsertOutcome, SortSpec, UpdateAck, COMMENTS, PAYMENTS, REPORTS, SURVEYS,
    USERS, VOTES,
};
use crate::utils::error::{AppError, AppResult};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub async fn new(uri: &str, db_name: &str) -> AppResult<Self> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));
        client_options.app_name = Some("survey-service".to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        db.run_command(doc! { "ping": 1 }).await?;
        log::info!("✅ Pinged MongoDB deployment, database: {}", db_name);

        let store = Self { client, db };
        store.ensure_indexes().await?;

        Ok(store)
    }

    /// Creates the unique indexes the dedup writes rely on, plus lookup indexes.
    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("🔧 Creating database indexes...");

        let unique = |keys: Document| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build()
        };
        let plain = |keys: Document| IndexModel::builder().keys(keys).build();

        // Unique indexes are load-bearing: a failure here aborts startup.
        let required = [
            (USERS, unique(doc! { "email": 1 }), "users(email) unique"),
            (VOTES, unique(doc! { "voterEmail": 1, "surveyId": 1 }), "votes(voterEmail, surveyId) unique"),
            (REPORTS, unique(doc! { "userEmail": 1, "surveyId": 1 }), "reports(userEmail, surveyId) unique"),
        ];

        for (collection, index, label) in required {
            self.collection(collection).create_index(index).await.map_err(|e| {
                AppError::Database(format!("Failed to create index {}: {}", label, e))
            })?;
            log::info!("   ✅ Index created: {}", label);
        }

        let lookups = [
            (SURVEYS, plain(doc! { "category": 1 }), "surveys(category)"),
            (COMMENTS, plain(doc! { "commentId": 1 }), "comments(commentId)"),
            (COMMENTS, plain(doc! { "userEmail": 1 }), "comments(userEmail)"),
            (REPORTS, plain(doc! { "userEmail": 1 }), "reports(userEmail)"),
            (PAYMENTS, plain(doc! { "email": 1 }), "payments(email)"),
        ];

        for (collection, index, label) in lookups {
            match self.collection(collection).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: {}", label),
                Err(e) => log::debug!("   ℹ️  Index not created: {} ({})", label, e),
            }
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

fn update_ack(result: mongodb::results::UpdateResult) -> UpdateAck {
    UpdateAck {
        matched_count: result.matched_count,
        modified_count: result.modified_count,
        upserted_id: result.upserted_id.and_then(|id| id.as_object_id()).map(|id| id.to_hex()),
    }
}

fn inserted_id(result: mongodb::results::InsertOneResult) -> AppResult<ObjectId> {
    result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::Database("Inserted document has no ObjectId".to_string()))
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> AppResult<ObjectId> {
        let result = self.collection(collection).insert_one(doc).await?;
        inserted_id(result)
    }

    async fn insert_unique(
        &self,
        collection: &str,
        _key: Document,
        doc: Document,
    ) -> AppResult<InsertOutcome> {
        // The key is enforced by the unique index created in `ensure_indexes`.
        match self.collection(collection).insert_one(doc).await {
            Ok(result) => Ok(InsertOutcome::Inserted(inserted_id(result)?)),
            Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_one(&self, collection: &str, filter: Document) -> AppResult<Option<Document>> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<SortSpec>,
    ) -> AppResult<Vec<Document>> {
        let coll = self.collection(collection);
        let mut action = coll.find(filter);
        if let Some(sort) = sort {
            let mut spec = Document::new();
            spec.insert(sort.field, sort.direction);
            action = action.sort(spec);
        }

        let cursor = action.await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn set_fields(
        &self,
        collection: &str,
        filter: Document,
        fields: Document,
        upsert: bool,
    ) -> AppResult<UpdateAck> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": fields })
            .upsert(upsert)
            .await?;
        Ok(update_ack(result))
    }

    async fn increment(
        &self,
        collection: &str,
        filter: Document,
        field: &str,
        delta: i64,
    ) -> AppResult<UpdateAck> {
        let mut inc = Document::new();
        inc.insert(field, delta);

        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$inc": inc })
            .await?;
        Ok(update_ack(result))
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<u64> {
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, collection: &str, filter: Document) -> AppResult<u64> {
        Ok(self.collection(collection).count_documents(filter).await?)
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        log::info!("👋 MongoDB client closed");
    }
}
