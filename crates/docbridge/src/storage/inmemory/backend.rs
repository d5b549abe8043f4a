//! In-memory backend implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use tokio::sync::RwLock;

use docbridge_core::store::{
    apply_update, matches, upsert_seed, DeleteManyOutcome, DocumentBackend, FindOptions,
    InsertManyOutcome, InsertOneOutcome, Result, StoreError, UpdateManyOutcome, UpdateOptions,
    WriteOptions,
};

/// In-memory document backend for testing.
///
/// Each collection is a `Vec<Document>` kept in insertion order. Data is
/// not persisted and will be lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, Vec::len)
    }
}

/// Ensures the document carries an `_id`, generating an `ObjectId` first in
/// field order when it is missing.
fn with_id(document: Document) -> (Bson, Document) {
    if let Some(id) = document.get("_id") {
        return (id.clone(), document);
    }
    let id = Bson::ObjectId(ObjectId::new());
    let mut stored = doc! { "_id": id.clone() };
    for (key, value) in document {
        stored.insert(key, value);
    }
    (id, stored)
}

fn insert(documents: &mut Vec<Document>, document: Document) -> Result<Bson> {
    let (id, stored) = with_id(document);
    if documents.iter().any(|existing| existing.get("_id") == Some(&id)) {
        return Err(StoreError::AlreadyExists(format!("duplicate key _id: {id}")));
    }
    documents.push(stored);
    Ok(id)
}

fn first_match(documents: &[Document], filter: &Document) -> Result<Option<usize>> {
    for (index, document) in documents.iter().enumerate() {
        if matches(document, filter)? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

/// Inserts the document an upsert produces, creating the collection only
/// once the seed and update have both succeeded.
fn upsert(
    collections: &mut HashMap<String, Vec<Document>>,
    collection: &str,
    filter: &Document,
    update: &Document,
) -> Result<Bson> {
    let seeded = apply_update(&upsert_seed(filter)?, update)?;
    insert(collections.entry(collection.to_string()).or_default(), seeded)
}

#[async_trait]
impl DocumentBackend for InMemoryBackend {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(None);
        };
        Ok(first_match(documents, &filter)?.map(|index| documents[index].clone()))
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for document in documents {
            if options.limit().is_some_and(|limit| found.len() as u64 >= limit) {
                break;
            }
            if matches(document, &filter)? {
                found.push(document.clone());
            }
        }
        Ok(found)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        _options: WriteOptions,
    ) -> Result<InsertOneOutcome> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();
        let inserted_id = insert(documents, document)?;
        Ok(InsertOneOutcome { inserted_id })
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        _options: WriteOptions,
    ) -> Result<InsertManyOutcome> {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection.to_string()).or_default();

        // Ordered insert: documents before a failure stay inserted.
        let mut inserted_ids = Vec::with_capacity(documents.len());
        for document in documents {
            inserted_ids.push(insert(stored, document)?);
        }
        Ok(InsertManyOutcome { inserted_ids })
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        _options: WriteOptions,
    ) -> Result<Option<Document>> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };
        Ok(first_match(documents, &filter)?.map(|index| documents.remove(index)))
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
        _options: WriteOptions,
    ) -> Result<DeleteManyOutcome> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(DeleteManyOutcome { deleted_count: 0 });
        };

        let doomed = documents
            .iter()
            .map(|document| matches(document, &filter))
            .collect::<Result<Vec<bool>>>()?;
        let deleted_count = doomed.iter().filter(|hit| **hit).count() as u64;

        let mut flags = doomed.into_iter();
        documents.retain(|_| !flags.next().unwrap_or(false));

        Ok(DeleteManyOutcome { deleted_count })
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Result<Option<Document>> {
        let mut collections = self.collections.write().await;

        if let Some(documents) = collections.get_mut(collection) {
            if let Some(index) = first_match(documents, &filter)? {
                let updated = apply_update(&documents[index], &update)?;
                return Ok(Some(std::mem::replace(&mut documents[index], updated)));
            }
        }

        if options.upsert {
            upsert(&mut collections, collection, &filter, &update)?;
        }
        Ok(None)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Result<UpdateManyOutcome> {
        let mut collections = self.collections.write().await;

        // Evaluate everything first so a failing update leaves the
        // collection untouched.
        let mut pending = Vec::new();
        if let Some(documents) = collections.get(collection) {
            for (index, document) in documents.iter().enumerate() {
                if matches(document, &filter)? {
                    pending.push((index, apply_update(document, &update)?));
                }
            }
        }

        if pending.is_empty() {
            let upserted_id = if options.upsert {
                Some(upsert(&mut collections, collection, &filter, &update)?)
            } else {
                None
            };
            return Ok(UpdateManyOutcome {
                matched_count: 0,
                modified_count: 0,
                upserted_id,
            });
        }

        let matched_count = pending.len() as u64;
        let mut modified_count = 0;
        if let Some(documents) = collections.get_mut(collection) {
            for (index, updated) in pending {
                if documents[index] != updated {
                    documents[index] = updated;
                    modified_count += 1;
                }
            }
        }

        Ok(UpdateManyOutcome {
            matched_count,
            modified_count,
            upserted_id: None,
        })
    }
}
