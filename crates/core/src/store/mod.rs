mod error;
mod exit_codes;
mod matching;
mod traits;
mod types;
mod validation;

pub use error::{Result, StoreError};
pub use exit_codes::store_error_to_exit_code;
pub use matching::{apply_update, matches, upsert_seed};
pub use traits::DocumentBackend;
pub use types::{
    DeleteManyOutcome, FindOptions, InsertManyOutcome, InsertOneOutcome, UpdateManyOutcome,
    UpdateOptions, WriteOptions, DEFAULT_WRITE_TIMEOUT,
};
pub use validation::{
    parse_document_id, validate_collection_name, validate_connection_url, validate_data,
    validate_database_name, validate_document, validate_filter, validate_items, validate_search,
};
