//! Command-line surface of the connector.
//!
//! Filter and data arguments are MongoDB Extended JSON; results are printed
//! back as relaxed Extended JSON.

use anyhow::{bail, Context, Result};
use bson::{Bson, Document};
use clap::Subcommand;
use serde_json::Value;

use docbridge_core::store::DocumentBackend;

use crate::connector::Connector;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get a document by its hex object id
    FindById { collection: String, id: String },

    /// Get documents matching a filter
    Find {
        collection: String,
        /// Extended JSON filter, e.g. '{"status": "active"}'
        filter: String,
        /// Maximum number of documents (0 = no limit)
        #[arg(long, short, default_value_t = 0)]
        limit: u64,
    },

    /// Get the first document matching a filter
    FindOne { collection: String, filter: String },

    /// Insert a single document
    InsertOne { collection: String, data: String },

    /// Insert a JSON array of documents
    InsertMany { collection: String, items: String },

    /// Delete a document by its hex object id
    DeleteById { collection: String, id: String },

    /// Delete every document matching a filter
    DeleteMany { collection: String, filter: String },

    /// Update a document by its hex object id
    UpdateById {
        collection: String,
        id: String,
        /// Extended JSON update, e.g. '{"$set": {"status": "done"}}'
        data: String,
        /// Insert the document when it does not exist
        #[arg(long)]
        upsert: bool,
    },

    /// Update every document matching a filter
    UpdateMany {
        collection: String,
        filter: String,
        data: String,
        /// Insert a document when nothing matches
        #[arg(long)]
        upsert: bool,
    },
}

/// Runs a command against `connector` and returns its JSON output.
///
/// Store failures are returned as [`StoreError`](docbridge_core::store::StoreError)
/// inside the `anyhow::Error`, so callers can recover them with
/// `downcast_ref`.
pub async fn execute<B>(connector: &Connector<B>, command: Command) -> Result<Value>
where
    B: DocumentBackend,
{
    let output = match command {
        Command::FindById { collection, id } => {
            optional_json(connector.find_by_id(&collection, &id).await?)
        }
        Command::Find {
            collection,
            filter,
            limit,
        } => {
            let documents = connector
                .find(&collection, parse_document(&filter)?, limit)
                .await?;
            Value::Array(documents.into_iter().map(document_json).collect())
        }
        Command::FindOne { collection, filter } => optional_json(
            connector
                .find_one(&collection, parse_document(&filter)?)
                .await?,
        ),
        Command::InsertOne { collection, data } => serde_json::to_value(
            connector
                .insert_one(&collection, parse_document(&data)?)
                .await?,
        )?,
        Command::InsertMany { collection, items } => serde_json::to_value(
            connector
                .insert_many(&collection, parse_documents(&items)?)
                .await?,
        )?,
        Command::DeleteById { collection, id } => {
            optional_json(connector.delete_by_id(&collection, &id).await?)
        }
        Command::DeleteMany { collection, filter } => serde_json::to_value(
            connector
                .delete_many(&collection, parse_document(&filter)?)
                .await?,
        )?,
        Command::UpdateById {
            collection,
            id,
            data,
            upsert,
        } => optional_json(
            connector
                .update_by_id(&collection, &id, parse_document(&data)?, upsert)
                .await?,
        ),
        Command::UpdateMany {
            collection,
            filter,
            data,
            upsert,
        } => serde_json::to_value(
            connector
                .update_many(
                    &collection,
                    parse_document(&filter)?,
                    parse_document(&data)?,
                    upsert,
                )
                .await?,
        )?,
    };
    Ok(output)
}

/// Parses an Extended JSON object into a document.
pub fn parse_document(input: &str) -> Result<Document> {
    match parse_bson(input)? {
        Bson::Document(document) => Ok(document),
        other => bail!("expected a JSON object, got {:?}", other.element_type()),
    }
}

/// Parses an Extended JSON array of objects into documents.
pub fn parse_documents(input: &str) -> Result<Vec<Document>> {
    let Bson::Array(items) = parse_bson(input)? else {
        bail!("expected a JSON array of objects");
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Bson::Document(document) => Ok(document),
            other => bail!(
                "item {index} is not a JSON object: {:?}",
                other.element_type()
            ),
        })
        .collect()
}

fn parse_bson(input: &str) -> Result<Bson> {
    let json: Value = serde_json::from_str(input).context("argument is not valid JSON")?;
    Bson::try_from(json).context("argument is not valid Extended JSON")
}

fn document_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

fn optional_json(document: Option<Document>) -> Value {
    document.map_or(Value::Null, document_json)
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use docbridge_core::store::StoreError;
    use serde_json::json;

    use super::*;
    use crate::storage::InMemoryBackend;

    fn connector() -> Connector<InMemoryBackend> {
        Connector::new(InMemoryBackend::new())
    }

    #[test]
    fn test_parse_document_extended_json() {
        let document =
            parse_document(r#"{"_id": {"$oid": "65a1f0c2e4b0a1b2c3d4e5f6"}, "n": 1}"#).unwrap();

        assert_eq!(
            document.get_object_id("_id").unwrap().to_hex(),
            "65a1f0c2e4b0a1b2c3d4e5f6"
        );
        assert_eq!(document.get_i32("n").unwrap(), 1);
    }

    #[test]
    fn test_parse_document_rejects_non_objects() {
        assert!(parse_document("[1, 2]").is_err());
        assert!(parse_document("not json").is_err());
    }

    #[test]
    fn test_parse_documents() {
        let documents = parse_documents(r#"[{"a": 1}, {"b": 2}]"#).unwrap();
        assert_eq!(documents.len(), 2);

        assert!(parse_documents(r#"{"a": 1}"#).is_err());
        assert!(parse_documents(r#"[{"a": 1}, 2]"#).is_err());
    }

    #[tokio::test]
    async fn test_execute_insert_and_find() {
        let connector = connector();

        let inserted = execute(
            &connector,
            Command::InsertMany {
                collection: "tasks".to_string(),
                items: r#"[{"title": "a", "done": false}, {"title": "b", "done": true}]"#
                    .to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(inserted["inserted_ids"].as_array().unwrap().len(), 2);

        let found = execute(
            &connector,
            Command::Find {
                collection: "tasks".to_string(),
                filter: r#"{"done": false}"#.to_string(),
                limit: 0,
            },
        )
        .await
        .unwrap();
        let found = found.as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["title"], json!("a"));
        assert!(found[0]["_id"]["$oid"].is_string());
    }

    #[tokio::test]
    async fn test_execute_find_by_id_missing_prints_null() {
        let connector = connector();

        let output = execute(
            &connector,
            Command::FindById {
                collection: "tasks".to_string(),
                id: "65a1f0c2e4b0a1b2c3d4e5f6".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(output, Value::Null);
    }

    #[tokio::test]
    async fn test_execute_surfaces_store_errors() {
        let connector = connector();

        let err = execute(
            &connector,
            Command::DeleteMany {
                collection: "tasks".to_string(),
                filter: "{}".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::EmptyFilter)
        );
    }

    #[tokio::test]
    async fn test_execute_update_many_output() {
        let connector = connector();
        execute(
            &connector,
            Command::InsertOne {
                collection: "tasks".to_string(),
                data: r#"{"title": "a"}"#.to_string(),
            },
        )
        .await
        .unwrap();

        let output = execute(
            &connector,
            Command::UpdateMany {
                collection: "tasks".to_string(),
                filter: r#"{"title": "a"}"#.to_string(),
                data: r#"{"$set": {"done": true}}"#.to_string(),
                upsert: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            output,
            json!({ "matched_count": 1, "modified_count": 1, "upserted_id": null })
        );
    }
}
