//! Wiring of the store and the services that sit on it.
//!
//! The server builds one [`Services`] at startup and shares it across handlers.

use std::path::PathBuf;
use std::sync::Arc;

use models::{Book, Category, User};
use tracing::info;

use crate::auth::repo::FileAuthRepository;
use crate::auth::service::{AuthService, AuthSettings};
use crate::errors::StoreError;
use crate::file::{books, categories, BookStore, CategoryStore};
use crate::storage::{MissingFilePolicy, RecordStore, StoreOptions};

#[derive(Clone, Debug)]
pub struct RuntimeOptions {
    pub data_dir: PathBuf,
    pub missing_file: MissingFilePolicy,
    pub unique_email: bool,
    pub seed_empty_files: bool,
    pub auth: AuthSettings,
}

#[derive(Clone)]
pub struct Services {
    pub store: Arc<RecordStore>,
    pub books: Arc<BookStore>,
    pub categories: Arc<CategoryStore>,
    pub auth: Arc<AuthService<FileAuthRepository>>,
}

/// Open the data directory, optionally seed `[]` files for missing
/// collections, and build every service.
pub async fn open_services(opts: &RuntimeOptions) -> Result<Services, StoreError> {
    let store_options = StoreOptions { missing_file: opts.missing_file };
    let store = RecordStore::open(&opts.data_dir, store_options).await?;

    if opts.seed_empty_files {
        let mut seeded = 0;
        let users = store.collection::<User>(crate::auth::repo::file::COLLECTION);
        seeded += users.ensure_exists().await? as usize;
        seeded += store.collection::<Book>(books::COLLECTION).ensure_exists().await? as usize;
        let category_file = store.collection::<Category>(categories::COLLECTION);
        seeded += category_file.ensure_exists().await? as usize;
        info!(seeded, "collection files checked");
    }

    let repo = Arc::new(FileAuthRepository::new(&store, opts.unique_email));
    Ok(Services {
        books: BookStore::new(&store),
        categories: CategoryStore::new(&store),
        auth: Arc::new(AuthService::new(repo, opts.auth.clone())),
        store,
    })
}
