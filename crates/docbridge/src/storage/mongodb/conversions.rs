//! Driver option and result conversion functions.
//!
//! Pure functions translating between `docbridge_core::store` types and the
//! driver's own types. These are testable without a server.

use std::collections::HashMap;

use docbridge_core::store::{
    DeleteManyOutcome, FindOptions, InsertManyOutcome, InsertOneOutcome, UpdateManyOutcome,
    WriteOptions,
};
use mongodb::bson::Bson;
use mongodb::options::WriteConcern;
use mongodb::results::{DeleteResult, InsertManyResult, InsertOneResult, UpdateResult};

/// Build the write concern carrying the configured timeout.
pub fn write_concern(options: WriteOptions) -> WriteConcern {
    WriteConcern::builder()
        .w_timeout(options.write_timeout)
        .build()
}

/// Convert a find limit to the driver's signed limit, `None` when unlimited.
pub fn find_limit(options: FindOptions) -> Option<i64> {
    options
        .limit()
        .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX))
}

pub fn insert_one_outcome(result: InsertOneResult) -> InsertOneOutcome {
    InsertOneOutcome {
        inserted_id: result.inserted_id,
    }
}

/// The driver reports inserted ids keyed by input position; order them.
pub fn insert_many_outcome(result: InsertManyResult) -> InsertManyOutcome {
    InsertManyOutcome {
        inserted_ids: ordered_ids(result.inserted_ids),
    }
}

pub fn delete_many_outcome(result: DeleteResult) -> DeleteManyOutcome {
    DeleteManyOutcome {
        deleted_count: result.deleted_count,
    }
}

pub fn update_many_outcome(result: UpdateResult) -> UpdateManyOutcome {
    UpdateManyOutcome {
        matched_count: result.matched_count,
        modified_count: result.modified_count,
        upserted_id: result.upserted_id,
    }
}

fn ordered_ids(ids: HashMap<usize, Bson>) -> Vec<Bson> {
    let mut indexed: Vec<(usize, Bson)> = ids.into_iter().collect();
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, id)| id).collect()
}
