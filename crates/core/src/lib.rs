//! Functional core for docbridge.
//!
//! Everything in this crate is pure: error types, argument guards, the
//! backend trait, and the document matching used by the in-memory backend.
//! Driver I/O lives in the `docbridge` crate.

pub mod store;
