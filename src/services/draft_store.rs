use async_trait::async_trait;

use crate::domain::draft::{DraftId, DraftRecord, MessageRef};
use crate::error::AppResult;

/// Keyed persistence of pending drafts. Operations are atomic with respect to
/// each other; a missing key is `None`, never an error.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn put(&self, record: &DraftRecord) -> AppResult<()>;
    async fn get(&self, id: &DraftId) -> AppResult<Option<DraftRecord>>;
    /// Reads and removes in one step; at most one caller receives the record.
    async fn pop_and_delete(&self, id: &DraftId) -> AppResult<Option<DraftRecord>>;
    /// Records the notification of a draft that is still pending. Returns
    /// `false` without writing anything once the draft has been consumed.
    async fn attach_status_message(&self, id: &DraftId, status: &MessageRef) -> AppResult<bool>;
    async fn pending_ids(&self) -> AppResult<Vec<DraftId>>;
}
