use async_trait::async_trait;
use bson::Document;

use super::{
    DeleteManyOutcome, FindOptions, InsertManyOutcome, InsertOneOutcome, Result,
    UpdateManyOutcome, UpdateOptions, WriteOptions,
};

/// A document database backend.
///
/// Implementations forward each call to their storage unchanged. Argument
/// validation happens before a call reaches this trait.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Gets the first document matching `filter`.
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Gets all documents matching `filter`.
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>>;

    /// Inserts a single document.
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        options: WriteOptions,
    ) -> Result<InsertOneOutcome>;

    /// Inserts a batch of documents.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: WriteOptions,
    ) -> Result<InsertManyOutcome>;

    /// Removes the first document matching `filter` and returns it.
    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        options: WriteOptions,
    ) -> Result<Option<Document>>;

    /// Removes every document matching `filter`.
    async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
        options: WriteOptions,
    ) -> Result<DeleteManyOutcome>;

    /// Updates the first document matching `filter` and returns it as it
    /// was before the update.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Result<Option<Document>>;

    /// Updates every document matching `filter`.
    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Result<UpdateManyOutcome>;
}
