use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::conversation::AttachmentDescriptor;
use crate::domain::ticket::TicketDraft;
use crate::error::AppError;

/// Stable draft key derived from the message that triggered it. Rendered as
/// `<channel>_<message ts>`; channel ids never contain `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DraftId {
    channel_id: String,
    message_ts: String,
}

impl DraftId {
    pub fn new(channel_id: impl Into<String>, message_ts: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            message_ts: message_ts.into(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (channel, ts) = value.trim().split_once('_')?;
        if channel.is_empty() || ts.is_empty() {
            return None;
        }
        Some(Self::new(channel, ts))
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.channel_id, self.message_ts)
    }
}

impl TryFrom<String> for DraftId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DraftId::parse(&value).ok_or_else(|| AppError::Store(format!("invalid draft id '{value}'")))
    }
}

impl From<DraftId> for String {
    fn from(value: DraftId) -> Self {
        value.to_string()
    }
}

/// Address of a chat message: channel plus message timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel: String,
    pub ts: String,
}

impl MessageRef {
    pub fn new(channel: &str, ts: &str) -> Self {
        Self {
            channel: channel.to_string(),
            ts: ts.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub id: DraftId,
    pub ticket: TicketDraft,
    pub origin_link: String,
    pub requesting_user_id: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentDescriptor>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<MessageRef>,
}
