//! Argument guards applied before any call reaches a backend.
//!
//! Each guard is a pure function returning the matching [`StoreError`]
//! variant when its argument is empty or malformed.

use bson::oid::ObjectId;
use bson::Document;

use super::{Result, StoreError};

/// Checks that a connection URL is present.
pub fn validate_connection_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(StoreError::InvalidConnectionUrl);
    }
    Ok(())
}

/// Checks that a database name is present.
pub fn validate_database_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidDatabaseName);
    }
    Ok(())
}

/// Checks that a collection name is present.
pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidCollectionName);
    }
    Ok(())
}

/// Parses a hex document identifier into an [`ObjectId`].
///
/// # Examples
///
/// ```
/// use docbridge_core::store::{parse_document_id, StoreError};
///
/// assert!(parse_document_id("65a1f0c2e4b0a1b2c3d4e5f6").is_ok());
/// assert_eq!(parse_document_id(""), Err(StoreError::InvalidId));
/// assert_eq!(parse_document_id("not-an-id"), Err(StoreError::InvalidId));
/// ```
pub fn parse_document_id(id: &str) -> Result<ObjectId> {
    if id.is_empty() {
        return Err(StoreError::InvalidId);
    }
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId)
}

/// Checks that a search filter has at least one key.
pub fn validate_search(filter: &Document) -> Result<()> {
    if filter.is_empty() {
        return Err(StoreError::InvalidSearchObject);
    }
    Ok(())
}

/// Checks that a document to insert has at least one key.
pub fn validate_document(document: &Document) -> Result<()> {
    if document.is_empty() {
        return Err(StoreError::EmptyDocument);
    }
    Ok(())
}

/// Checks that a batch insert carries at least one document.
pub fn validate_items(items: &[Document]) -> Result<()> {
    if items.is_empty() {
        return Err(StoreError::InvalidItems);
    }
    Ok(())
}

/// Checks that a write filter has at least one key.
pub fn validate_filter(filter: &Document) -> Result<()> {
    if filter.is_empty() {
        return Err(StoreError::EmptyFilter);
    }
    Ok(())
}

/// Checks that update data has at least one key.
pub fn validate_data(data: &Document) -> Result<()> {
    if data.is_empty() {
        return Err(StoreError::EmptyData);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_connection_url_rejects_empty() {
        assert_eq!(
            validate_connection_url(""),
            Err(StoreError::InvalidConnectionUrl)
        );
        assert_eq!(
            validate_connection_url("   "),
            Err(StoreError::InvalidConnectionUrl)
        );
        assert!(validate_connection_url("mongodb://localhost:27017").is_ok());
    }

    #[test]
    fn test_database_and_collection_names() {
        assert_eq!(validate_database_name(""), Err(StoreError::InvalidDatabaseName));
        assert!(validate_database_name("app").is_ok());
        assert_eq!(
            validate_collection_name(" "),
            Err(StoreError::InvalidCollectionName)
        );
        assert!(validate_collection_name("users").is_ok());
    }

    #[test]
    fn test_parse_document_id() {
        let id = parse_document_id("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        assert_eq!(id.to_hex(), "65a1f0c2e4b0a1b2c3d4e5f6");

        assert_eq!(parse_document_id(""), Err(StoreError::InvalidId));
        assert_eq!(parse_document_id("xyz"), Err(StoreError::InvalidId));
        // 23 hex digits
        assert_eq!(
            parse_document_id("65a1f0c2e4b0a1b2c3d4e5f"),
            Err(StoreError::InvalidId)
        );
    }

    #[test]
    fn test_empty_documents_are_rejected_with_distinct_errors() {
        let empty = doc! {};
        assert_eq!(validate_search(&empty), Err(StoreError::InvalidSearchObject));
        assert_eq!(validate_document(&empty), Err(StoreError::EmptyDocument));
        assert_eq!(validate_filter(&empty), Err(StoreError::EmptyFilter));
        assert_eq!(validate_data(&empty), Err(StoreError::EmptyData));
    }

    #[test]
    fn test_non_empty_documents_pass() {
        let filter = doc! { "name": "ada" };
        assert!(validate_search(&filter).is_ok());
        assert!(validate_document(&filter).is_ok());
        assert!(validate_filter(&filter).is_ok());
        assert!(validate_data(&filter).is_ok());
    }

    #[test]
    fn test_items() {
        assert_eq!(validate_items(&[]), Err(StoreError::InvalidItems));
        assert!(validate_items(&[doc! { "a": 1 }]).is_ok());
    }
}
