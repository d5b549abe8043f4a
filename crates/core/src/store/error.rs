use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid Connection URL")]
    InvalidConnectionUrl,
    #[error("Invalid database name")]
    InvalidDatabaseName,
    #[error("Invalid collection name")]
    InvalidCollectionName,
    #[error("Invalid ID provided")]
    InvalidId,
    #[error("Invalid Search Object")]
    InvalidSearchObject,
    #[error("Empty object cannot be saved")]
    EmptyDocument,
    #[error("Invalid items array")]
    InvalidItems,
    #[error("Empty filter object")]
    EmptyFilter,
    #[error("Empty data object")]
    EmptyData,
    #[error("Not connected: call connect() first")]
    NotConnected,
    #[error("Document already exists: {0}")]
    AlreadyExists(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns `true` if the error was raised by an argument guard before
    /// anything reached the backend.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidConnectionUrl
                | StoreError::InvalidDatabaseName
                | StoreError::InvalidCollectionName
                | StoreError::InvalidId
                | StoreError::InvalidSearchObject
                | StoreError::EmptyDocument
                | StoreError::InvalidItems
                | StoreError::EmptyFilter
                | StoreError::EmptyData
        )
    }
}

/// Result type for document store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
