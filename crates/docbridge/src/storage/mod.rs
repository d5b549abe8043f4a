//! Backend implementations.
//!
//! This module provides concrete implementations of the
//! `DocumentBackend` trait defined in `docbridge_core::store`. Backends are
//! selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `mongodb` (default): MongoDB backend using the official `mongodb` driver
//! - `inmemory` (default): in-memory backend for tests and dry runs
//!
//! Unlike storage engines that own a file, both backends can be compiled in
//! together.

#[cfg(not(any(feature = "mongodb", feature = "inmemory")))]
compile_error!(
    "No backend selected. Enable 'mongodb' or 'inmemory' feature. \
    Example: cargo build -p docbridge --features mongodb"
);

#[cfg(feature = "mongodb")]
pub mod mongodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "mongodb")]
pub use mongodb::MongoBackend;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryBackend;
