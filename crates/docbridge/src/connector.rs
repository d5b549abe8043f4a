//! Validating CRUD facade over a document backend.
//!
//! Wraps a `DocumentBackend` implementation with argument guards:
//! - **Ids** must be non-empty hex object ids
//! - **Filters and data** must carry at least one key
//! - **Batches** must carry at least one document
//!
//! Once a call passes its guards it is forwarded unchanged and the backend's
//! result or error is returned as is.

use std::time::Duration;

use bson::{doc, Document};

use docbridge_core::store::{
    parse_document_id, validate_collection_name, validate_data, validate_document,
    validate_filter, validate_items, validate_search, DeleteManyOutcome, DocumentBackend,
    FindOptions, InsertManyOutcome, InsertOneOutcome, Result, UpdateManyOutcome, UpdateOptions,
    WriteOptions,
};

#[cfg(feature = "mongodb")]
use crate::storage::MongoBackend;

/// Validating connector.
///
/// # Type Parameters
///
/// * `B` - The underlying backend implementation
pub struct Connector<B>
where
    B: DocumentBackend,
{
    backend: B,
    write_options: WriteOptions,
}

impl<B> Connector<B>
where
    B: DocumentBackend,
{
    /// Creates a connector over `backend` with the default 1s write timeout.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            write_options: WriteOptions::default(),
        }
    }

    /// Overrides the write-concern timeout used by inserts and deletes.
    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_options = WriteOptions { write_timeout };
        self
    }

    /// Get the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gets a document by its hex object id.
    pub async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        validate_collection_name(collection)?;
        let id = parse_document_id(id)?;

        tracing::debug!(collection = %collection, id = %id, "Finding document by id");
        self.backend.find_one(collection, doc! { "_id": id }).await
    }

    /// Gets documents matching `filter`. A `limit` of `0` returns every match.
    pub async fn find(
        &self,
        collection: &str,
        filter: Document,
        limit: u64,
    ) -> Result<Vec<Document>> {
        validate_collection_name(collection)?;
        validate_search(&filter)?;

        tracing::debug!(collection = %collection, filter = %filter, limit, "Finding documents");
        self.backend
            .find(collection, filter, FindOptions::limited(limit))
            .await
    }

    /// Gets the first document matching `filter`.
    pub async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        validate_collection_name(collection)?;
        validate_search(&filter)?;

        tracing::debug!(collection = %collection, filter = %filter, "Finding one document");
        self.backend.find_one(collection, filter).await
    }

    /// Inserts a single document.
    pub async fn insert_one(&self, collection: &str, data: Document) -> Result<InsertOneOutcome> {
        validate_collection_name(collection)?;
        validate_document(&data)?;

        tracing::debug!(collection = %collection, "Inserting document");
        self.backend
            .insert_one(collection, data, self.write_options)
            .await
    }

    /// Inserts a batch of documents in order.
    pub async fn insert_many(
        &self,
        collection: &str,
        items: Vec<Document>,
    ) -> Result<InsertManyOutcome> {
        validate_collection_name(collection)?;
        validate_items(&items)?;

        tracing::debug!(collection = %collection, count = items.len(), "Inserting documents");
        self.backend
            .insert_many(collection, items, self.write_options)
            .await
    }

    /// Deletes a document by its hex object id, returning the removed
    /// document if there was one.
    pub async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        validate_collection_name(collection)?;
        let id = parse_document_id(id)?;

        tracing::debug!(collection = %collection, id = %id, "Deleting document by id");
        self.backend
            .find_one_and_delete(collection, doc! { "_id": id }, self.write_options)
            .await
    }

    /// Deletes every document matching `filter`.
    pub async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
    ) -> Result<DeleteManyOutcome> {
        validate_collection_name(collection)?;
        validate_filter(&filter)?;

        tracing::debug!(collection = %collection, filter = %filter, "Deleting documents");
        self.backend
            .delete_many(collection, filter, self.write_options)
            .await
    }

    /// Updates a document by its hex object id, returning it as it was
    /// before the update.
    pub async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        data: Document,
        upsert: bool,
    ) -> Result<Option<Document>> {
        validate_collection_name(collection)?;
        let id = parse_document_id(id)?;
        validate_data(&data)?;

        tracing::debug!(collection = %collection, id = %id, upsert, "Updating document by id");
        self.backend
            .find_one_and_update(collection, doc! { "_id": id }, data, UpdateOptions { upsert })
            .await
    }

    /// Updates every document matching `filter`.
    pub async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        data: Document,
        upsert: bool,
    ) -> Result<UpdateManyOutcome> {
        validate_collection_name(collection)?;
        validate_filter(&filter)?;
        validate_data(&data)?;

        tracing::debug!(collection = %collection, filter = %filter, upsert, "Updating documents");
        self.backend
            .update_many(collection, filter, data, UpdateOptions { upsert })
            .await
    }
}

/// Connector over the MongoDB driver.
#[cfg(feature = "mongodb")]
pub type MongoConnector = Connector<MongoBackend>;

#[cfg(feature = "mongodb")]
impl Connector<MongoBackend> {
    /// Builds a connector for `url` and `database`. Validates both but does
    /// not open a connection; call [`connect`](Self::connect) next.
    pub fn open(url: impl Into<String>, database: impl Into<String>) -> Result<Self> {
        Ok(Self::new(MongoBackend::new(url, database)?))
    }

    /// Opens the driver connection and selects the database.
    pub async fn connect(&self) -> Result<()> {
        self.backend.connect().await
    }

    /// Closes the driver connection. Further calls fail with `NotConnected`
    /// until [`connect`](Self::connect) is called again.
    pub async fn close_connection(&self) {
        self.backend.close_connection().await
    }

    /// Whether the connector currently holds an open connection.
    pub async fn is_connected(&self) -> bool {
        self.backend.is_connected().await
    }
}


#[cfg(all(test, feature = "mongodb"))]
mod mongo_tests {
    use docbridge_core::store::StoreError;

    use super::*;

    #[test]
    fn test_open_validates_arguments() {
        assert!(matches!(
            MongoConnector::open("", "app"),
            Err(StoreError::InvalidConnectionUrl)
        ));
        assert!(matches!(
            MongoConnector::open("mongodb://localhost:27017", " "),
            Err(StoreError::InvalidDatabaseName)
        ));
    }

    #[tokio::test]
    async fn test_open_is_lazy() {
        let connector = MongoConnector::open("mongodb://localhost:27017", "app").unwrap();

        assert!(!connector.is_connected().await);
        assert_eq!(
            connector.find_by_id("users", "65a1f0c2e4b0a1b2c3d4e5f6").await,
            Err(StoreError::NotConnected)
        );
    }

    #[tokio::test]
    async fn test_guards_run_before_connection_check() {
        let connector = MongoConnector::open("mongodb://localhost:27017", "app").unwrap();

        assert_eq!(
            connector.find_by_id("users", "").await,
            Err(StoreError::InvalidId)
        );
    }
}
