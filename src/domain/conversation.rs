use serde::{Deserialize, Serialize};

/// Transfer mode the chat platform reports for files it does not host.
pub const EXTERNAL_TRANSFER_MODE: &str = "external";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    pub name: String,
    pub source_url: Option<String>,
    pub transfer_mode: Option<String>,
    pub mime_type: Option<String>,
}

impl AttachmentDescriptor {
    pub fn is_externally_hosted(&self) -> bool {
        self.transfer_mode.as_deref() == Some(EXTERNAL_TRANSFER_MODE)
    }
}

/// Outcome of pushing a draft's attachments into the tracker. Both lists keep
/// input order; externally hosted files appear in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<String>,
}

impl AttachmentReport {
    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty() && self.failed.is_empty()
    }

    /// One-line status, e.g. `📎 2 file(s) attached | ⚠️ 1 failed`.
    pub fn summary_line(&self) -> String {
        let mut line = String::new();
        if !self.uploaded.is_empty() {
            line.push_str(&format!("📎 {} file(s) attached", self.uploaded.len()));
        }
        if !self.failed.is_empty() {
            if !line.is_empty() {
                line.push_str(" | ");
            }
            line.push_str(&format!("⚠️ {} failed", self.failed.len()));
        }
        if line.is_empty() {
            line.push_str("No attachments");
        }
        line
    }

    /// Multi-line listing of file names, empty when nothing was attempted.
    pub fn detail_lines(&self) -> String {
        let mut text = String::new();
        if !self.uploaded.is_empty() {
            text.push_str(&format!("\n📎 *Attached:* {}", self.uploaded.join(", ")));
        }
        if !self.failed.is_empty() {
            text.push_str(&format!(
                "\n⚠️ *Failed to attach:* {}",
                self.failed.join(", ")
            ));
        }
        text
    }
}

pub fn transferable_count(attachments: &[AttachmentDescriptor]) -> usize {
    attachments
        .iter()
        .filter(|attachment| !attachment.is_externally_hosted())
        .count()
}

/// One message of a thread as returned by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub user_id: Option<String>,
    pub text: String,
    pub files: Vec<AttachmentDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub transcript: String,
    pub attachments: Vec<AttachmentDescriptor>,
}
