//! MongoDB error mapping.
//!
//! Maps driver errors to `StoreError` from `docbridge_core::store`. The
//! driver's message is carried through unchanged.

use docbridge_core::store::StoreError;
use mongodb::error::{Error, ErrorKind, InsertManyError, WriteFailure};

/// Server code for a unique index violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Map a driver error to StoreError.
pub fn map_driver_error(err: Error) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Authentication { .. }
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::Io(_) => StoreError::ConnectionFailed(err.to_string()),
        ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
            StoreError::Serialization(err.to_string())
        }
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            map_write_code(write_error.code, err.to_string())
        }
        ErrorKind::InsertMany(InsertManyError {
            write_errors: Some(write_errors),
            ..
        }) => match write_errors.first() {
            Some(first) => map_write_code(first.code, err.to_string()),
            None => StoreError::QueryFailed(err.to_string()),
        },
        _ => StoreError::QueryFailed(err.to_string()),
    }
}

/// Map a server write-error code to StoreError.
pub fn map_write_code(code: i32, message: String) -> StoreError {
    match code {
        DUPLICATE_KEY_CODE => StoreError::AlreadyExists(message),
        _ => StoreError::QueryFailed(message),
    }
}

/// Map a generic connection/config error to StoreError.
pub fn map_connection_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::ConnectionFailed(err.to_string())
}
