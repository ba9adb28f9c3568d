use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{DocumentStore, InsertOutcome, SortSpec, UpdateAck};
use crate::utils::error::{AppError, AppResult};

/// In-process `DocumentStore`. Every operation runs under one lock, which makes
/// `insert_unique` a true check-and-insert.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, HashMap<String, Vec<Document>>>> {
        self.collections
            .lock()
            .map_err(|_| AppError::Database("memory store lock poisoned".to_string()))
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| doc.get(key) == Some(expected))
}

fn with_id(mut doc: Document) -> (ObjectId, Document) {
    match doc.get_object_id("_id") {
        Ok(id) => (id, doc),
        Err(_) => {
            let id = ObjectId::new();
            doc.insert("_id", id);
            (id, doc)
        }
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Orders missing/null first, then numbers, then strings, like a server-side sort would.
fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    fn rank(value: Option<&Bson>) -> u8 {
        match value {
            None | Some(Bson::Null) => 0,
            Some(v) if as_f64(v).is_some() => 1,
            Some(Bson::String(_)) => 2,
            Some(_) => 3,
        }
    }

    match (a, b) {
        (Some(x), Some(y)) => match (as_f64(x), as_f64(y), x, y) {
            (Some(l), Some(r), _, _) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
            (_, _, Bson::String(l), Bson::String(r)) => l.cmp(r),
            _ => rank(a).cmp(&rank(b)),
        },
        _ => rank(a).cmp(&rank(b)),
    }
}

fn add(current: Option<&Bson>, delta: i64) -> AppResult<Bson> {
    let checked = |v: i64| {
        v.checked_add(delta)
            .ok_or_else(|| AppError::Database(format!("Increment overflows: {} + {}", v, delta)))
    };

    match current {
        None | Some(Bson::Null) => Ok(Bson::Int64(delta)),
        Some(Bson::Int32(v)) => {
            let sum = checked(*v as i64)?;
            Ok(i32::try_from(sum).map(Bson::Int32).unwrap_or(Bson::Int64(sum)))
        }
        Some(Bson::Int64(v)) => Ok(Bson::Int64(checked(*v)?)),
        Some(Bson::Double(v)) => Ok(Bson::Double(v + delta as f64)),
        Some(other) => Err(AppError::Database(format!(
            "Cannot increment a non-numeric value: {}",
            other
        ))),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> AppResult<ObjectId> {
        let (id, doc) = with_id(doc);
        self.lock()?.entry(collection.to_string()).or_default().push(doc);
        Ok(id)
    }

    async fn insert_unique(
        &self,
        collection: &str,
        key: Document,
        doc: Document,
    ) -> AppResult<InsertOutcome> {
        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();

        if docs.iter().any(|existing| matches(existing, &key)) {
            return Ok(InsertOutcome::Duplicate);
        }

        let (id, doc) = with_id(doc);
        docs.push(doc);
        Ok(InsertOutcome::Inserted(id))
    }

    async fn find_one(&self, collection: &str, filter: Document) -> AppResult<Option<Document>> {
        Ok(self
            .lock()?
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| matches(doc, &filter)).cloned()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        sort: Option<SortSpec>,
    ) -> AppResult<Vec<Document>> {
        let mut found: Vec<Document> = self
            .lock()?
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| matches(doc, &filter)).cloned().collect())
            .unwrap_or_default();

        if let Some(sort) = sort {
            found.sort_by(|a, b| {
                let ordering = compare(a.get(&sort.field), b.get(&sort.field));
                if sort.direction < 0 {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(found)
    }

    async fn set_fields(
        &self,
        collection: &str,
        filter: Document,
        fields: Document,
        upsert: bool,
    ) -> AppResult<UpdateAck> {
        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(doc) = docs.iter_mut().find(|doc| matches(doc, &filter)) {
            let mut modified = false;
            for (key, value) in fields {
                if doc.get(&key) != Some(&value) {
                    doc.insert(key, value);
                    modified = true;
                }
            }
            return Ok(UpdateAck {
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateAck { matched_count: 0, modified_count: 0, upserted_id: None });
        }

        let mut created = filter;
        for (key, value) in fields {
            created.insert(key, value);
        }
        let (id, created) = with_id(created);
        docs.push(created);

        Ok(UpdateAck {
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id.to_hex()),
        })
    }

    async fn increment(
        &self,
        collection: &str,
        filter: Document,
        field: &str,
        delta: i64,
    ) -> AppResult<UpdateAck> {
        let mut collections = self.lock()?;
        let target = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| matches(doc, &filter)));

        match target {
            Some(doc) => {
                let next = add(doc.get(field), delta)?;
                doc.insert(field, next);
                Ok(UpdateAck { matched_count: 1, modified_count: 1, upserted_id: None })
            }
            None => Ok(UpdateAck { matched_count: 0, modified_count: 0, upserted_id: None }),
        }
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> AppResult<u64> {
        let mut collections = self.lock()?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        match docs.iter().position(|doc| matches(doc, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count(&self, collection: &str, filter: Document) -> AppResult<u64> {
        Ok(self
            .lock()?
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| matches(doc, &filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn test_insert_unique_rejects_same_key() {
        let store = MemoryStore::new();
        let key = doc! { "voterEmail": "a@x.com", "surveyId": "s1" };

        let first = store
            .insert_unique("votes", key.clone(), doc! { "voterEmail": "a@x.com", "surveyId": "s1", "choice": "yes" })
            .await
            .unwrap();
        let second = store
            .insert_unique("votes", key.clone(), doc! { "voterEmail": "a@x.com", "surveyId": "s1", "choice": "no" })
            .await
            .unwrap();

        assert!(matches!(first, InsertOutcome::Inserted(_)));
        assert_eq!(second, InsertOutcome::Duplicate);
        assert_eq!(store.count("votes", key).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_fields_upsert_creates_then_merges() {
        let store = MemoryStore::new();
        let filter = doc! { "email": "u@x.com" };

        let created = store
            .set_fields("users", filter.clone(), doc! { "email": "u@x.com", "name": "U" }, true)
            .await
            .unwrap();
        assert_eq!(created.matched_count, 0);
        assert!(created.upserted_id.is_some());

        let merged = store
            .set_fields("users", filter.clone(), doc! { "name": "Updated" }, true)
            .await
            .unwrap();
        assert_eq!(merged.matched_count, 1);
        assert_eq!(merged.modified_count, 1);

        let user = store.find_one("users", filter).await.unwrap().unwrap();
        assert_eq!(user.get_str("name").unwrap(), "Updated");
        assert_eq!(store.count("users", doc! {}).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_increment_missing_document_matches_nothing() {
        let store = MemoryStore::new();
        let id = store.insert_one("surveys", doc! { "report": 0 }).await.unwrap();

        let hit = store.increment("surveys", doc! { "_id": id }, "report", 1).await.unwrap();
        let miss = store
            .increment("surveys", doc! { "_id": ObjectId::new() }, "report", 1)
            .await
            .unwrap();

        assert_eq!(hit.matched_count, 1);
        assert_eq!(miss.matched_count, 0);

        let survey = store.find_one("surveys", doc! { "_id": id }).await.unwrap().unwrap();
        assert_eq!(survey.get_i32("report").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_sorts_numbers_across_int_widths() {
        let store = MemoryStore::new();
        store.insert_one("surveys", doc! { "n": "b", "totalVotes": 5_i64 }).await.unwrap();
        store.insert_one("surveys", doc! { "n": "a", "totalVotes": 12 }).await.unwrap();
        store.insert_one("surveys", doc! { "n": "c", "totalVotes": 1.5 }).await.unwrap();

        let desc = store
            .find("surveys", doc! {}, Some(SortSpec::descending("totalVotes")))
            .await
            .unwrap();
        let names: Vec<&str> = desc.iter().map(|d| d.get_str("n").unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_increment_overflow_is_an_error() {
        let store = MemoryStore::new();
        let id = store.insert_one("surveys", doc! { "report": i64::MAX }).await.unwrap();

        let result = store.increment("surveys", doc! { "_id": id }, "report", 1).await;
        assert!(matches!(result, Err(AppError::Database(_))));

        let survey = store.find_one("surveys", doc! { "_id": id }).await.unwrap().unwrap();
        assert_eq!(survey.get_i64("report").unwrap(), i64::MAX);

        let widened = store.insert_one("surveys", doc! { "report": i32::MAX }).await.unwrap();
        store.increment("surveys", doc! { "_id": widened }, "report", 1).await.unwrap();
        let survey = store.find_one("surveys", doc! { "_id": widened }).await.unwrap().unwrap();
        assert_eq!(survey.get_i64("report").unwrap(), i32::MAX as i64 + 1);
    }
}
