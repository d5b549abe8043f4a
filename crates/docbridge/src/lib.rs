//! docbridge - a validated CRUD connector for document databases.
//!
//! [`Connector`] checks the shape of every argument and forwards the call
//! unchanged to a [`DocumentBackend`](docbridge_core::store::DocumentBackend).
//! The production backend wraps the official MongoDB driver.
//!
//! ```rust,ignore
//! use bson::doc;
//! use docbridge::MongoConnector;
//!
//! let connector = MongoConnector::open("mongodb://localhost:27017", "app")?;
//! connector.connect().await?;
//!
//! let created = connector.insert_one("users", doc! { "name": "ada" }).await?;
//! let users = connector.find("users", doc! { "name": "ada" }, 10).await?;
//!
//! connector.close_connection().await;
//! ```

pub mod cli;
pub mod config;
pub mod connector;
pub mod storage;

pub use config::Config;
pub use connector::Connector;
#[cfg(feature = "mongodb")]
pub use connector::MongoConnector;
