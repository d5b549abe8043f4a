use std::time::Duration;

use bson::Bson;
use serde::Serialize;

/// Write-concern timeout applied to insert and delete calls.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Options for multi-document reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    limit: u64,
}

impl FindOptions {
    /// Caps the number of returned documents. A limit of `0` means no cap.
    pub fn limited(limit: u64) -> Self {
        Self { limit }
    }

    /// Returns the cap, or `None` when unlimited.
    pub fn limit(&self) -> Option<u64> {
        (self.limit > 0).then_some(self.limit)
    }
}

/// Options for insert and delete calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub write_timeout: Duration,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// Options for update calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Insert a new document when the filter matches nothing.
    pub upsert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertOneOutcome {
    pub inserted_id: Bson,
}

/// Identifiers of inserted documents, in the order they were supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertManyOutcome {
    pub inserted_ids: Vec<Bson>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteManyOutcome {
    pub deleted_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateManyOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Bson>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_is_unlimited() {
        assert_eq!(FindOptions::default().limit(), None);
        assert_eq!(FindOptions::limited(0).limit(), None);
        assert_eq!(FindOptions::limited(25).limit(), Some(25));
    }

    #[test]
    fn test_write_options_default_timeout() {
        assert_eq!(
            WriteOptions::default().write_timeout,
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_update_options_default_no_upsert() {
        assert!(!UpdateOptions::default().upsert);
    }

    #[test]
    fn test_update_many_outcome_serializes() {
        let outcome = UpdateManyOutcome {
            matched_count: 3,
            modified_count: 2,
            upserted_id: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "matched_count": 3,
                "modified_count": 2,
                "upserted_id": null
            })
        );
    }
}
