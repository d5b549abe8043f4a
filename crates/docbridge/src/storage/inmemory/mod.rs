//! In-memory backend for testing.
//!
//! Collections are `Vec<Document>`s in a HashMap wrapped in `Arc<RwLock<_>>`.
//! Filters and updates go through `docbridge_core::store::matching`, so the
//! backend accepts the same subset of operators the tests rely on.
//!
//! # Example
//!
//! ```rust,ignore
//! use docbridge::connector::Connector;
//! use docbridge::storage::inmemory::InMemoryBackend;
//!
//! let connector = Connector::new(InMemoryBackend::new());
//! // Use connector for testing...
//! ```

mod backend;

pub use backend::InMemoryBackend;
