use std::future::Future;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use models::Record;
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

use super::{atomic, records, MissingFilePolicy};
use crate::errors::StoreError;
use crate::metrics::{STORE_ERRORS_TOTAL, STORE_MUTATIONS_TOTAL};

/// Extracts the value a collection keeps unique across its records.
pub type UniqueKey<T> = fn(&T) -> String;

/// Handle to one JSON-array collection file.
///
/// Reads go straight to disk. Every mutation runs as load, mutate, save while
/// holding the collection lock, which is shared by all handles opened on the
/// same name through one [`RecordStore`](super::RecordStore).
pub struct Collection<T> {
    name: Arc<str>,
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    missing_file: MissingFilePolicy,
    unique_key: Option<UniqueKey<T>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            path: self.path.clone(),
            lock: Arc::clone(&self.lock),
            missing_file: self.missing_file,
            unique_key: self.unique_key,
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    pub(super) fn new(
        name: &str,
        path: PathBuf,
        lock: Arc<Mutex<()>>,
        missing_file: MissingFilePolicy,
    ) -> Self {
        Self {
            name: Arc::from(name),
            path,
            lock,
            missing_file,
            unique_key: None,
            _marker: PhantomData,
        }
    }

    /// Reject creates and updates that would give two records the same key.
    pub fn with_unique_key(mut self, key: UniqueKey<T>) -> Self {
        self.unique_key = Some(key);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deserialize the whole file.
    pub async fn load_all(&self) -> Result<Vec<T>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return match self.missing_file {
                    MissingFilePolicy::Empty => Ok(Vec::new()),
                    MissingFilePolicy::NotFound => Err(StoreError::missing_file(&self.name)),
                };
            }
            Err(e) => return Err(StoreError::io(&self.name, e)),
        };
        let records: Vec<T> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::corrupt(&self.name, e))?;
        debug!(collection = %self.name, count = records.len(), "collection loaded");
        Ok(records)
    }

    /// Replace the file with `records`, pretty-printed, via temp file and rename.
    ///
    /// Callers that read the file first should hold the lock, see
    /// [`Collection::with_exclusive_access`].
    pub async fn save_all(&self, records: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| StoreError::io(&self.name, e.into()))?;
        atomic::write_atomic(&self.path, &bytes)
            .await
            .map_err(|e| StoreError::io(&self.name, e))?;
        debug!(
            collection = %self.name,
            count = records.len(),
            bytes = bytes.len(),
            "collection saved"
        );
        Ok(())
    }

    /// Run `f` while holding this collection's lock.
    ///
    /// The guard is dropped on every exit path: success, error, or the future
    /// being cancelled mid-way.
    pub async fn with_exclusive_access<R, F, Fut>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, StoreError>>,
    {
        let _guard = self.lock.lock().await;
        f().await
    }

    /// Load, apply `f`, save, all inside the exclusive section. When `f` fails
    /// nothing is written.
    pub async fn mutate<R, F>(&self, op: &'static str, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
    {
        let result = self
            .with_exclusive_access(move || async move {
                let mut records = self.load_all().await?;
                let out = f(&mut records)?;
                self.save_all(&records).await?;
                Ok(out)
            })
            .await;
        match &result {
            Ok(_) => STORE_MUTATIONS_TOTAL.with_label_values(&[&*self.name, op]).inc(),
            Err(e) => STORE_ERRORS_TOTAL.with_label_values(&[&*self.name, e.kind().as_str()]).inc(),
        }
        result
    }

    /// Write an empty array if the file does not exist yet.
    pub async fn ensure_exists(&self) -> Result<bool, StoreError> {
        self.with_exclusive_access(move || async move {
            match fs::metadata(&self.path).await {
                Ok(_) => Ok(false),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    self.save_all(&[]).await?;
                    info!(
                        collection = %self.name,
                        path = %self.path.display(),
                        "seeded empty collection"
                    );
                    Ok(true)
                }
                Err(e) => Err(StoreError::io(&self.name, e)),
            }
        })
        .await
    }

    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        self.load_all().await
    }

    pub async fn get(&self, id: u64) -> Result<T, StoreError> {
        let all = self.load_all().await?;
        records::find_by_id(&all, id)
            .cloned()
            .ok_or_else(|| StoreError::record_not_found(&self.name, id))
    }

    /// First record matching `pred`, in file order.
    pub async fn find_first<P>(&self, pred: P) -> Result<Option<T>, StoreError>
    where
        P: Fn(&T) -> bool,
    {
        Ok(self.load_all().await?.into_iter().find(|r| pred(r)))
    }

    /// Append a record built from `draft`; the id is assigned under the lock.
    pub async fn create(&self, draft: T::Draft) -> Result<T, StoreError> {
        let created = self
            .mutate("create", |all| {
                let record = T::from_draft(records::next_id(&self.name, all)?, draft);
                self.ensure_unique(all, &record)?;
                all.push(record.clone());
                Ok(record)
            })
            .await?;
        info!(collection = %self.name, id = created.id(), "record created");
        Ok(created)
    }

    pub async fn update(&self, id: u64, patch: T::Patch) -> Result<T, StoreError> {
        let updated = self
            .mutate("update", |all| {
                let idx = all
                    .iter()
                    .position(|r| r.id() == id)
                    .ok_or_else(|| StoreError::record_not_found(&self.name, id))?;
                let merged = records::upsert_merge(all[idx].clone(), patch);
                self.ensure_unique(all, &merged)?;
                all[idx] = merged.clone();
                Ok(merged)
            })
            .await?;
        info!(collection = %self.name, id, "record updated");
        Ok(updated)
    }

    /// Remove the record with `id` and return it. A missing id leaves the file untouched.
    pub async fn delete(&self, id: u64) -> Result<T, StoreError> {
        let removed = self
            .mutate("delete", |all| {
                let removed = records::find_by_id(all, id)
                    .cloned()
                    .ok_or_else(|| StoreError::record_not_found(&self.name, id))?;
                *all = records::filter_out(std::mem::take(all), id);
                Ok(removed)
            })
            .await?;
        info!(collection = %self.name, id, "record deleted");
        Ok(removed)
    }

    fn ensure_unique(&self, all: &[T], candidate: &T) -> Result<(), StoreError> {
        let Some(key_of) = self.unique_key else { return Ok(()) };
        let key = key_of(candidate);
        if all.iter().any(|r| r.id() != candidate.id() && key_of(r) == key) {
            return Err(StoreError::duplicate(&self.name, key));
        }
        Ok(())
    }
}
