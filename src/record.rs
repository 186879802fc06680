// Record trait for entries held by the roster store

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;

/// Core trait that any record kept by the store must implement
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + PartialEq + Debug + 'static {
    /// Editable part of the record (everything except the id)
    type Fields: Clone + Debug;

    /// Store-assigned identifier, always positive
    fn id(&self) -> u64;

    /// Build a full record from an id and its fields
    fn from_fields(id: u64, fields: Self::Fields) -> Self;

    /// Whether this record satisfies the per-record invariants
    ///
    /// Persisted collections containing an invalid record are rejected as a whole.
    fn is_valid(&self) -> bool {
        is_valid_id(self.id())
    }

    /// Fixed key the collection is persisted under
    fn storage_key() -> &'static str
    where
        Self: Sized;

    /// Seed data used when no valid persisted state exists
    ///
    /// Returns a fresh vector on every call so callers never share it.
    fn default_dataset() -> Vec<Self>
    where
        Self: Sized;
}

/// Largest id a record may carry (2^53 - 1, the largest integer a JSON
/// number keeps exactly in every reader)
pub const MAX_ID: u64 = (1 << 53) - 1;

/// Ids are positive and no larger than `MAX_ID`
pub fn is_valid_id(id: u64) -> bool {
    (1..=MAX_ID).contains(&id)
}

/// Next id for a collection: max(existing ids, 0) + 1
///
/// Once the max reaches `MAX_ID` the smallest unused id is handed out instead,
/// so the result is always a valid id not present in `records`.
pub fn next_id<T: Record>(records: &[T]) -> u64 {
    let max = records.iter().map(|r| r.id()).max().unwrap_or(0);
    if max < MAX_ID {
        return max + 1;
    }

    let used: HashSet<u64> = records.iter().map(|r| r.id()).collect();
    (1..=MAX_ID).find(|id| !used.contains(id)).unwrap_or(MAX_ID)
}

/// True when every record is valid and no id appears twice
pub fn is_valid_collection<T: Record>(records: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(records.len());
    records.iter().all(|r| r.is_valid() && seen.insert(r.id()))
}
