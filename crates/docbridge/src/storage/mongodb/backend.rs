//! MongoDB backend implementation.
//!
//! Implements `DocumentBackend` from `docbridge_core::store` over the
//! official driver.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tokio::sync::RwLock;

use docbridge_core::store::{
    validate_connection_url, validate_database_name, DeleteManyOutcome, DocumentBackend,
    FindOptions, InsertManyOutcome, InsertOneOutcome, Result, StoreError, UpdateManyOutcome,
    UpdateOptions, WriteOptions,
};

use super::conversions::{
    delete_many_outcome, find_limit, insert_many_outcome, insert_one_outcome,
    update_many_outcome, write_concern,
};
use super::error::{map_connection_error, map_driver_error};

/// An open client together with the selected database.
struct Connection {
    client: Client,
    database: Database,
}

/// MongoDB-based backend.
///
/// Construction only validates its arguments; nothing touches the network
/// until [`MongoBackend::connect`] is called.
pub struct MongoBackend {
    url: String,
    database_name: String,
    app_name: Option<String>,
    connect_timeout: Option<Duration>,
    connection: RwLock<Option<Connection>>,
}

impl MongoBackend {
    /// Creates a backend for the given connection string and database.
    pub fn new(url: impl Into<String>, database_name: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let database_name = database_name.into();
        validate_connection_url(&url)?;
        validate_database_name(&database_name)?;

        Ok(Self {
            url,
            database_name,
            app_name: None,
            connect_timeout: None,
            connection: RwLock::new(None),
        })
    }

    /// Sets the application name reported to the server.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Bounds both the socket connect and server selection.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Get the database name.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Opens the client, selects the database and pings it.
    ///
    /// Connecting while already connected replaces the previous client.
    pub async fn connect(&self) -> Result<()> {
        let mut options = ClientOptions::parse(self.url.as_str())
            .await
            .map_err(map_connection_error)?;
        if let Some(app_name) = &self.app_name {
            options.app_name = Some(app_name.clone());
        }
        if let Some(timeout) = self.connect_timeout {
            options.connect_timeout = Some(timeout);
            options.server_selection_timeout = Some(timeout);
        }

        let client = Client::with_options(options).map_err(map_connection_error)?;
        let database = client.database(&self.database_name);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(map_connection_error)?;

        tracing::info!(database = %self.database_name, "Connected to MongoDB");

        let previous = self
            .connection
            .write()
            .await
            .replace(Connection { client, database });
        if let Some(previous) = previous {
            tracing::debug!("Replacing previous MongoDB client");
            previous.client.shutdown().await;
        }
        Ok(())
    }

    /// Shuts the client down and drops the database handle.
    ///
    /// Does nothing when not connected.
    pub async fn close_connection(&self) {
        let connection = self.connection.write().await.take();
        if let Some(connection) = connection {
            connection.client.shutdown().await;
            tracing::info!(database = %self.database_name, "MongoDB connection closed");
        }
    }

    /// Whether `connect` has succeeded and the connection is still open.
    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    async fn collection(&self, name: &str) -> Result<Collection<Document>> {
        let connection = self.connection.read().await;
        connection
            .as_ref()
            .map(|c| c.database.collection::<Document>(name))
            .ok_or(StoreError::NotConnected)
    }
}

#[async_trait]
impl DocumentBackend for MongoBackend {
    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        self.collection(collection)
            .await?
            .find_one(filter)
            .await
            .map_err(map_driver_error)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>> {
        let collection = self.collection(collection).await?;
        let mut find = collection.find(filter);
        if let Some(limit) = find_limit(options) {
            find = find.limit(limit);
        }

        let cursor = find.await.map_err(map_driver_error)?;
        cursor
            .try_collect::<Vec<Document>>()
            .await
            .map_err(map_driver_error)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        options: WriteOptions,
    ) -> Result<InsertOneOutcome> {
        self.collection(collection)
            .await?
            .insert_one(document)
            .write_concern(write_concern(options))
            .await
            .map(insert_one_outcome)
            .map_err(map_driver_error)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
        options: WriteOptions,
    ) -> Result<InsertManyOutcome> {
        self.collection(collection)
            .await?
            .insert_many(documents)
            .write_concern(write_concern(options))
            .await
            .map(insert_many_outcome)
            .map_err(map_driver_error)
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: Document,
        options: WriteOptions,
    ) -> Result<Option<Document>> {
        self.collection(collection)
            .await?
            .find_one_and_delete(filter)
            .write_concern(write_concern(options))
            .await
            .map_err(map_driver_error)
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: Document,
        options: WriteOptions,
    ) -> Result<DeleteManyOutcome> {
        self.collection(collection)
            .await?
            .delete_many(filter)
            .write_concern(write_concern(options))
            .await
            .map(delete_many_outcome)
            .map_err(map_driver_error)
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Result<Option<Document>> {
        self.collection(collection)
            .await?
            .find_one_and_update(filter, update)
            .upsert(options.upsert)
            .await
            .map_err(map_driver_error)
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
        options: UpdateOptions,
    ) -> Result<UpdateManyOutcome> {
        self.collection(collection)
            .await?
            .update_many(filter, update)
            .upsert(options.upsert)
            .await
            .map(update_many_outcome)
            .map_err(map_driver_error)
    }
}
