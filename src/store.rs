use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::info;

use crate::domain::draft::{DraftId, DraftRecord, MessageRef};
use crate::error::{AppError, AppResult};
use crate::services::DraftStore;

pub const STORE_FILE_NAME: &str = "pending_tickets.json";

type DraftMap = BTreeMap<String, DraftRecord>;

/// Pending drafts kept as one JSON object keyed by draft id. Every operation
/// loads, mutates and rewrites the whole file under a single lock, on the
/// blocking pool.
pub struct JsonFileDraftStore {
    file: Arc<StoreFile>,
}

struct StoreFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileDraftStore {
    pub fn open(data_dir: &Path) -> AppResult<Self> {
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            file: Arc::new(StoreFile {
                path: data_dir.join(STORE_FILE_NAME),
                lock: Mutex::new(()),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    /// Runs `op` against the loaded drafts while holding the store lock. The
    /// file is rewritten only when `op` reports a change.
    async fn transact<T, F>(&self, op: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut DraftMap) -> (T, bool) + Send + 'static,
    {
        let file = Arc::clone(&self.file);
        let outcome = tokio::task::spawn_blocking(move || {
            let _guard = file.exclusive();
            let mut drafts = file.load()?;
            let (value, changed) = op(&mut drafts);
            if changed {
                file.persist(&drafts)?;
            }
            Ok(value)
        })
        .await
        .map_err(|err| AppError::Store(format!("store task did not finish: {err}")))?;
        outcome
    }
}

impl StoreFile {
    fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> AppResult<DraftMap> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(DraftMap::new()),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(DraftMap::new());
        }
        serde_json::from_str(&raw).map_err(|err| {
            AppError::Store(format!("{} is not readable: {err}", self.path.display()))
        })
    }

    fn persist(&self, drafts: &DraftMap) -> AppResult<()> {
        let rendered = serde_json::to_string_pretty(drafts)?;
        write_atomic(&self.path, rendered.as_bytes())
    }
}

/// Replaces `path` through a sibling temp file and a rename, so readers see
/// either the old or the new content.
fn write_atomic(path: &Path, content: &[u8]) -> AppResult<()> {
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[async_trait]
impl DraftStore for JsonFileDraftStore {
    async fn put(&self, record: &DraftRecord) -> AppResult<()> {
        let record = record.clone();
        let id = record.id.clone();
        let pending = self
            .transact(move |drafts| {
                drafts.insert(record.id.to_string(), record);
                (drafts.len(), true)
            })
            .await?;
        info!(draft_id = %id, pending, "stored draft");
        Ok(())
    }

    async fn get(&self, id: &DraftId) -> AppResult<Option<DraftRecord>> {
        let key = id.to_string();
        let found = self
            .transact(move |drafts| (drafts.get(&key).cloned(), false))
            .await?;
        info!(draft_id = %id, found = found.is_some(), "looked up draft");
        Ok(found)
    }

    async fn attach_status_message(&self, id: &DraftId, status: &MessageRef) -> AppResult<bool> {
        let key = id.to_string();
        let status = status.clone();
        let updated = self
            .transact(move |drafts| match drafts.get_mut(&key) {
                Some(record) => {
                    record.status_message = Some(status);
                    (true, true)
                }
                None => (false, false),
            })
            .await?;
        info!(draft_id = %id, updated, "recorded status message");
        Ok(updated)
    }

    async fn pop_and_delete(&self, id: &DraftId) -> AppResult<Option<DraftRecord>> {
        let key = id.to_string();
        let popped = self
            .transact(move |drafts| {
                let popped = drafts.remove(&key);
                let changed = popped.is_some();
                (popped, changed)
            })
            .await?;
        info!(draft_id = %id, found = popped.is_some(), "popped draft");
        Ok(popped)
    }

    async fn pending_ids(&self) -> AppResult<Vec<DraftId>> {
        self.transact(|drafts| {
            let ids = drafts.values().map(|record| record.id.clone()).collect();
            (ids, false)
        })
        .await
    }
}
