use std::sync::Arc;

use models::{Book, BookInput, BookPatch};
use tracing::instrument;

use crate::errors::ServiceError;
use crate::storage::{Collection, RecordStore};

pub const COLLECTION: &str = "books";

/// Book catalog persisted in `books.json`.
#[derive(Clone)]
pub struct BookStore {
    books: Collection<Book>,
}

impl BookStore {
    pub fn new(store: &RecordStore) -> Arc<Self> {
        Arc::new(Self { books: store.collection(COLLECTION) })
    }

    pub fn collection(&self) -> &Collection<Book> {
        &self.books
    }

    pub async fn list(&self) -> Result<Vec<Book>, ServiceError> {
        Ok(self.books.list().await?)
    }

    pub async fn get(&self, id: u64) -> Result<Book, ServiceError> {
        Ok(self.books.get(id).await?)
    }

    /// Missing `title`/`author` become empty strings, a missing `price` becomes `"0"`.
    #[instrument(skip(self, input), fields(categoryid = ?input.categoryid))]
    pub async fn create(&self, input: BookInput) -> Result<Book, ServiceError> {
        let draft = input.into_new()?;
        Ok(self.books.create(draft).await?)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: u64, patch: BookPatch) -> Result<Book, ServiceError> {
        Ok(self.books.update(id, patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<Book, ServiceError> {
        Ok(self.books.delete(id).await?)
    }
}
