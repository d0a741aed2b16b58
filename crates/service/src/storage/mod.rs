//! JSON-file record store.
//!
//! One file per collection (`users.json`, `books.json`, ...) under a data
//! directory, each a top-level JSON array. Mutations are whole-file
//! read-modify-write cycles serialized by a per-collection lock; writes go
//! through a temp file and an atomic rename so a crash never leaves a torn
//! file behind. Locking is in-process only: one server process owns the
//! directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};

use models::Record;
use tokio::{fs, sync::Mutex};
use tracing::{info, warn};

use crate::errors::StoreError;

pub mod atomic;
pub mod collection;
pub mod records;

pub use collection::{Collection, UniqueKey};

/// What [`Collection::load_all`] returns when the file does not exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingFilePolicy {
    #[default]
    Empty,
    NotFound,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StoreOptions {
    pub missing_file: MissingFilePolicy,
}

/// Owns the data directory and hands out [`Collection`] handles.
pub struct RecordStore {
    dir: PathBuf,
    options: StoreOptions,
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RecordStore {
    /// Create the directory if needed and clear temp files left by interrupted writes.
    pub async fn open<P: Into<PathBuf>>(
        dir: P,
        options: StoreOptions,
    ) -> Result<Arc<Self>, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| StoreError::io("*", e))?;
        let swept = sweep_temp_files(&dir).await.map_err(|e| StoreError::io("*", e))?;
        if swept > 0 {
            warn!(dir = %dir.display(), swept, "removed temp files from interrupted writes");
        }
        info!(dir = %dir.display(), ?options, "record store opened");
        Ok(Arc::new(Self { dir, options, locks: StdMutex::new(HashMap::new()) }))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Handle on `<dir>/<name>.json`. Handles with the same name share one lock.
    pub fn collection<T: Record>(&self, name: &str) -> Collection<T> {
        let path = self.dir.join(format!("{name}.json"));
        Collection::new(name, path, self.lock_for(name), self.options.missing_file)
    }

    fn lock_for(&self, name: &str) -> Arc<Mutex<()>> {
        // a poisoned registry only means another thread panicked mid-insert; the map is intact
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(name.to_string()).or_default())
    }
}

async fn sweep_temp_files(dir: &Path) -> std::io::Result<usize> {
    let mut swept = 0;
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if atomic::is_temp_file(name) && entry.file_type().await?.is_file() {
            match fs::remove_file(entry.path()).await {
                Ok(()) => swept += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
    }
    Ok(swept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreErrorKind;
    use chrono::Utc;
    use models::{Book, BookPatch, Category, CategoryPatch, NewBook, NewCategory};
    use std::collections::HashSet;

    async fn open_tmp(
        policy: MissingFilePolicy,
    ) -> anyhow::Result<(tempfile::TempDir, Arc<RecordStore>)> {
        let dir = tempfile::tempdir()?;
        let store = RecordStore::open(dir.path(), StoreOptions { missing_file: policy }).await?;
        Ok((dir, store))
    }

    fn new_book(title: &str) -> NewBook {
        NewBook { categoryid: 1, title: title.into(), author: String::new(), price: "0".into() }
    }

    fn book(id: u64, title: &str) -> Book {
        Book {
            id,
            categoryid: 1,
            title: title.into(),
            author: "anon".into(),
            price: "9".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn missing_file_policy() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let books = store.collection::<Book>("books");
        assert!(books.load_all().await?.is_empty());

        let (_dir, strict) = open_tmp(MissingFilePolicy::NotFound).await?;
        let books = strict.collection::<Book>("books");
        let err = books.load_all().await.unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::NotFound);
        assert!(!err.is_record_not_found());

        assert!(books.ensure_exists().await?);
        assert!(!books.ensure_exists().await?);
        assert!(books.load_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_corrupt_store() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let books = store.collection::<Book>("books");

        fs::write(books.path(), b"[{\"id\": 1,").await?;
        assert_eq!(books.load_all().await.unwrap_err().kind(), StoreErrorKind::CorruptStore);

        fs::write(books.path(), b"{\"books\": []}").await?;
        assert_eq!(books.load_all().await.unwrap_err().kind(), StoreErrorKind::CorruptStore);
        Ok(())
    }

    #[tokio::test]
    async fn save_then_load_round_trips_regardless_of_prior_contents() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let books = store.collection::<Book>("books");
        fs::write(books.path(), b"garbage that is not json").await?;

        let saved = vec![book(4, "Earthsea"), book(2, "Lathe of Heaven")];
        books.save_all(&saved).await?;
        assert_eq!(books.load_all().await?, saved);

        books.save_all(&[]).await?;
        assert!(books.load_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn crud_through_collection() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let books = store.collection::<Book>("books");

        let a = books.create(new_book("A")).await?;
        let b = books.create(new_book("B")).await?;
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(books.get(2).await?.title, "B");

        books.delete(1).await?;
        // ids keep growing past gaps
        let c = books.create(new_book("C")).await?;
        assert_eq!(c.id, 3);

        let err = books.get(1).await.unwrap_err();
        assert!(err.is_record_not_found());

        let listed: Vec<u64> = books.list().await?.iter().map(|b| b.id).collect();
        assert_eq!(listed, vec![2, 3]);
        Ok(())
    }

    #[tokio::test]
    async fn update_merges_only_present_fields() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let books = store.collection::<Book>("books");
        let before = vec![book(1, "one"), book(2, "two"), book(3, "A")];
        books.save_all(&before).await?;

        let patch = BookPatch { title: Some("B".into()), ..Default::default() };
        let updated = books.update(3, patch).await?;
        assert_eq!(updated.title, "B");

        let after = books.load_all().await?;
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[1]);
        assert_eq!(after[2], Book { title: "B".into(), ..before[2].clone() });
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_id_leaves_file_byte_for_byte() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let books = store.collection::<Book>("books");
        books.save_all(&[book(1, "one"), book(2, "two")]).await?;
        let before = fs::read(books.path()).await?;

        let err = books.delete(99).await.unwrap_err();
        assert!(err.is_record_not_found());
        let err = books.update(99, BookPatch::default()).await.unwrap_err();
        assert!(err.is_record_not_found());

        assert_eq!(fs::read(books.path()).await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_get_unique_ids() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;

        let mut handles = Vec::new();
        for i in 0..32 {
            // a fresh handle per task; the lock comes from the shared registry
            let books = store.collection::<Book>("books");
            handles.push(tokio::spawn(
                async move { books.create(new_book(&format!("t{i}"))).await },
            ));
        }
        let mut ids = HashSet::new();
        for h in handles {
            let created = h.await??;
            assert!(ids.insert(created.id), "duplicate id {}", created.id);
        }

        let on_disk = store.collection::<Book>("books").load_all().await?;
        assert_eq!(on_disk.len(), 32);
        let disk_ids: HashSet<u64> = on_disk.iter().map(|b| b.id).collect();
        assert_eq!(disk_ids, ids);
        assert_eq!(disk_ids, (1..=32).collect::<HashSet<u64>>());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn collections_lock_independently() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let books = store.collection::<Book>("books");
        let categories = store.collection::<Category>("categories");

        // holding the books lock must not block a categories write
        let cats = &categories;
        let held = books
            .with_exclusive_access(move || async move {
                let created = tokio::time::timeout(
                    std::time::Duration::from_secs(5),
                    cats.create(NewCategory { name: "Poetry".into() }),
                )
                .await
                .map_err(|_| StoreError::corrupt("categories", "blocked by books lock"))??;
                Ok(created)
            })
            .await?;
        assert_eq!(held.id, 1);
        Ok(())
    }

    #[tokio::test]
    async fn lock_released_when_closure_fails() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let categories = store.collection::<Category>("categories");

        let failed: Result<(), StoreError> = categories
            .with_exclusive_access(|| async { Err(StoreError::corrupt("categories", "boom")) })
            .await;
        assert!(failed.is_err());

        let created = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            categories.create(NewCategory { name: "Drama".into() }),
        )
        .await??;
        assert_eq!(created.id, 1);
        Ok(())
    }

    #[tokio::test]
    async fn create_fails_cleanly_when_ids_are_exhausted() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let categories = store.collection::<Category>("categories");
        categories.save_all(&[Category { id: u64::MAX, name: "last".into() }]).await?;
        let before = fs::read(categories.path()).await?;

        let handle = {
            let categories = categories.clone();
            let draft = NewCategory { name: "next".into() };
            tokio::spawn(async move { categories.create(draft).await })
        };
        let err = handle.await?.unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::CorruptStore);
        assert_eq!(fs::read(categories.path()).await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn unique_key_rejects_duplicates_on_create_and_update() -> anyhow::Result<()> {
        let (_dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let categories = store
            .collection::<Category>("categories")
            .with_unique_key(|c| c.name.to_lowercase());

        categories.create(NewCategory { name: "Sci-Fi".into() }).await?;
        let other = categories.create(NewCategory { name: "Horror".into() }).await?;
        let before = fs::read(categories.path()).await?;

        let err = categories.create(NewCategory { name: "sci-fi".into() }).await.unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::DuplicateKey);
        let err = categories
            .update(other.id, CategoryPatch { name: Some("SCI-FI".into()) })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::DuplicateKey);
        assert_eq!(fs::read(categories.path()).await?, before);

        // re-saving a record under its own key is fine
        categories.update(other.id, CategoryPatch { name: Some("horror".into()) }).await?;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn aborted_writers_never_leave_unparseable_file() -> anyhow::Result<()> {
        let (dir, store) = open_tmp(MissingFilePolicy::Empty).await?;
        let books = store.collection::<Book>("books");
        let big: Vec<Book> = (1..=2_000).map(|i| book(i, &"x".repeat(64))).collect();
        books.save_all(&big).await?;

        for round in 0..20u64 {
            let writer = books.clone();
            let payload = big.clone();
            let task = tokio::spawn(async move { writer.save_all(&payload).await });
            tokio::time::sleep(std::time::Duration::from_micros(50 * round)).await;
            task.abort();
            let _ = task.await;
            assert_eq!(books.load_all().await?.len(), 2_000);
        }

        // a crashed writer's partial temp file next to the target is ignored on load
        // and swept on the next open
        let stray = dir.path().join(format!(".books.json-{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&stray, b"[{\"id\": 1, \"categ").await?;
        let foreign = dir.path().join(".operator-notes.tmp");
        fs::write(&foreign, b"keep me").await?;
        assert_eq!(books.load_all().await?.len(), 2_000);

        let reopened = RecordStore::open(dir.path(), StoreOptions::default()).await?;
        assert!(!stray.exists());
        assert!(foreign.exists());
        assert_eq!(reopened.collection::<Book>("books").load_all().await?.len(), 2_000);
        Ok(())
    }
}
