use std::sync::Arc;

use models::{Category, CategoryInput, CategoryPatch};
use tracing::instrument;

use crate::errors::ServiceError;
use crate::storage::{Collection, RecordStore};

pub const COLLECTION: &str = "categories";

/// Categories persisted in `categories.json`.
#[derive(Clone)]
pub struct CategoryStore {
    categories: Collection<Category>,
}

impl CategoryStore {
    pub fn new(store: &RecordStore) -> Arc<Self> {
        Arc::new(Self { categories: store.collection(COLLECTION) })
    }

    pub fn collection(&self) -> &Collection<Category> {
        &self.categories
    }

    pub async fn list(&self) -> Result<Vec<Category>, ServiceError> {
        Ok(self.categories.list().await?)
    }

    pub async fn get(&self, id: u64) -> Result<Category, ServiceError> {
        Ok(self.categories.get(id).await?)
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CategoryInput) -> Result<Category, ServiceError> {
        let draft = input.into_new()?;
        Ok(self.categories.create(draft).await?)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: u64, patch: CategoryPatch) -> Result<Category, ServiceError> {
        patch.validate()?;
        Ok(self.categories.update(id, patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<Category, ServiceError> {
        Ok(self.categories.delete(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreOptions;

    #[tokio::test]
    async fn category_store_crud() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let record_store = RecordStore::open(dir.path(), StoreOptions::default()).await?;
        let store = CategoryStore::new(&record_store);

        let fiction = store.create(CategoryInput { name: Some("Fiction".into()) }).await?;
        let poetry = store.create(CategoryInput { name: Some("Poetry".into()) }).await?;
        assert_eq!((fiction.id, poetry.id), (1, 2));

        let renamed = store.update(poetry.id, CategoryPatch { name: Some("Verse".into()) }).await?;
        assert_eq!(renamed.name, "Verse");
        assert!(matches!(
            store.update(poetry.id, CategoryPatch { name: Some(" ".into()) }).await,
            Err(ServiceError::Model(_))
        ));

        store.delete(fiction.id).await?;
        let names: Vec<String> = store.list().await?.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Verse".to_string()]);

        let blank = store.create(CategoryInput::default()).await;
        assert!(matches!(blank, Err(ServiceError::Model(_))));
        assert!(store.delete(99).await.unwrap_err().is_record_not_found());
        Ok(())
    }
}
