use std::io;

use thiserror::Error;

/// Coarse classification of a [`StoreError`], stable across messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    NotFound,
    CorruptStore,
    IoFailure,
    DuplicateKey,
}

impl StoreErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::CorruptStore => "corrupt_store",
            StoreErrorKind::IoFailure => "io_failure",
            StoreErrorKind::DuplicateKey => "duplicate_key",
        }
    }
}

/// Failures of a collection load, save or read-modify-write.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `id == None` means the collection file itself is absent.
    #[error("{}", not_found_message(.collection, .id))]
    NotFound { collection: String, id: Option<u64> },
    #[error("collection {collection} is corrupt: {reason}")]
    CorruptStore { collection: String, reason: String },
    #[error("i/o failure on collection {collection}: {source}")]
    Io {
        collection: String,
        #[source]
        source: io::Error,
    },
    #[error("duplicate key in {collection}: {key}")]
    DuplicateKey { collection: String, key: String },
}

fn not_found_message(collection: &str, id: &Option<u64>) -> String {
    match id {
        Some(id) => format!("{collection} record {id} not found"),
        None => format!("collection {collection} not found"),
    }
}

impl StoreError {
    pub fn record_not_found(collection: &str, id: u64) -> Self {
        Self::NotFound { collection: collection.to_string(), id: Some(id) }
    }

    pub fn missing_file(collection: &str) -> Self {
        Self::NotFound { collection: collection.to_string(), id: None }
    }

    pub fn corrupt(collection: &str, err: impl std::fmt::Display) -> Self {
        Self::CorruptStore { collection: collection.to_string(), reason: err.to_string() }
    }

    pub fn io(collection: &str, source: io::Error) -> Self {
        Self::Io { collection: collection.to_string(), source }
    }

    pub fn duplicate(collection: &str, key: impl Into<String>) -> Self {
        Self::DuplicateKey { collection: collection.to_string(), key: key.into() }
    }

    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::NotFound { .. } => StoreErrorKind::NotFound,
            StoreError::CorruptStore { .. } => StoreErrorKind::CorruptStore,
            StoreError::Io { .. } => StoreErrorKind::IoFailure,
            StoreError::DuplicateKey { .. } => StoreErrorKind::DuplicateKey,
        }
    }

    /// True only for a missing record on a by-id operation.
    pub fn is_record_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { id: Some(_), .. })
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn is_record_not_found(&self) -> bool {
        matches!(self, ServiceError::Store(e) if e.is_record_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages_distinguish_file_and_record() {
        let missing_record = StoreError::record_not_found("books", 9);
        assert_eq!(missing_record.to_string(), "books record 9 not found");
        assert_eq!(StoreError::missing_file("books").to_string(), "collection books not found");
        assert!(StoreError::record_not_found("books", 9).is_record_not_found());
        assert!(!StoreError::missing_file("books").is_record_not_found());
    }

    #[test]
    fn kinds_are_stable() {
        let io = StoreError::io("users", io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert_eq!(io.kind(), StoreErrorKind::IoFailure);
        assert_eq!(io.kind().as_str(), "io_failure");
        assert_eq!(StoreError::duplicate("users", "a@b.com").kind(), StoreErrorKind::DuplicateKey);
        assert_eq!(StoreError::corrupt("users", "eof").kind(), StoreErrorKind::CorruptStore);
    }
}
