//! Pure mapping from store errors to process exit codes.

use super::StoreError;

/// Maps a [`StoreError`] to a process exit code.
///
/// - validation errors -> 2
/// - `NotConnected`, `ConnectionFailed` -> 3
/// - `AlreadyExists` -> 4
/// - `QueryFailed`, `Serialization` -> 1
///
/// # Examples
///
/// ```
/// use docbridge_core::store::{store_error_to_exit_code, StoreError};
///
/// assert_eq!(store_error_to_exit_code(&StoreError::InvalidId), 2);
/// assert_eq!(store_error_to_exit_code(&StoreError::NotConnected), 3);
/// ```
pub fn store_error_to_exit_code(error: &StoreError) -> u8 {
    match error {
        e if e.is_validation() => 2,
        StoreError::NotConnected | StoreError::ConnectionFailed(_) => 3,
        StoreError::AlreadyExists(_) => 4,
        _ => 1,
    }
}
