use std::path::Path;

use async_trait::async_trait;

use crate::domain::conversation::ThreadMessage;
use crate::domain::draft::MessageRef;
use crate::error::AppResult;
use crate::render::blocks::{ModalView, OutboundMessage};

/// The slice of the messaging platform API the bridge relies on.
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn add_reaction(&self, target: &MessageRef, name: &str) -> AppResult<()>;
    async fn remove_reaction(&self, target: &MessageRef, name: &str) -> AppResult<()>;
    async fn channel_name(&self, channel: &str) -> AppResult<String>;
    /// Messages of the thread rooted at or containing `ts`, oldest first.
    async fn thread_replies(
        &self,
        channel: &str,
        ts: &str,
        limit: usize,
    ) -> AppResult<Vec<ThreadMessage>>;
    async fn user_display_name(&self, user: &str) -> AppResult<String>;
    async fn permalink(&self, channel: &str, ts: &str) -> AppResult<String>;
    /// Posting to a user id opens (or reuses) the direct-message channel.
    async fn post_message(&self, channel: &str, message: &OutboundMessage)
    -> AppResult<MessageRef>;
    async fn update_message(&self, target: &MessageRef, message: &OutboundMessage)
    -> AppResult<()>;
    async fn post_ephemeral(&self, channel: &str, user: &str, text: &str) -> AppResult<()>;
    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> AppResult<()>;
}

/// Source of privately hosted conversation files.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Streams `url` into `destination`, returning the byte count.
    async fn download_to(&self, url: &str, destination: &Path) -> AppResult<u64>;
}
