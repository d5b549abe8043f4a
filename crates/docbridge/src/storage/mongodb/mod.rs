//! MongoDB backend implementation.
//!
//! This module provides a MongoDB-based implementation of the backend trait
//! using the official `mongodb` driver. Pooling, retries and wire protocol
//! are left entirely to the driver.

mod backend;
mod conversions;
mod error;

pub use backend::MongoBackend;
