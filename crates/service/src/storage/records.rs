//! Pure helpers over an in-memory collection. No I/O happens here.

use models::Record;

use crate::errors::StoreError;

/// `1 + max(id)`, or `1` for an empty collection.
///
/// Must be called inside the collection's exclusive section, on the same
/// snapshot that the new record gets appended to. Fails once `u64::MAX` is taken.
pub fn next_id<T: Record>(collection: &str, records: &[T]) -> Result<u64, StoreError> {
    match records.iter().map(Record::id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| StoreError::corrupt(collection, "id space exhausted")),
    }
}

pub fn find_by_id<T: Record>(records: &[T], id: u64) -> Option<&T> {
    records.iter().find(|r| r.id() == id)
}

pub fn filter_out<T: Record>(records: Vec<T>, id: u64) -> Vec<T> {
    records.into_iter().filter(|r| r.id() != id).collect()
}

pub fn upsert_merge<T: Record>(existing: T, patch: T::Patch) -> T {
    existing.merge(patch)
}
