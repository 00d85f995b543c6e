use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::conversation::{AttachmentDescriptor, AttachmentReport};
use crate::domain::ticket::{CreatedIssue, IssueRouting, TicketDraft};
use crate::error::{AppError, AppResult};
use crate::services::FileSource;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Creates an issue whose description ends with a link back to the
    /// originating conversation.
    async fn create_issue(
        &self,
        ticket: &TicketDraft,
        origin_link: &str,
        routing: &IssueRouting,
    ) -> AppResult<CreatedIssue>;

    async fn upload_attachment(&self, issue_key: &str, file_name: &str, path: &Path)
    -> AppResult<()>;

    /// Copies every chat-hosted attachment onto the issue. Files fail
    /// independently; externally hosted entries are skipped entirely.
    async fn attach_files(
        &self,
        issue_key: &str,
        attachments: &[AttachmentDescriptor],
        source: &dyn FileSource,
    ) -> AttachmentReport {
        let mut report = AttachmentReport::default();
        for attachment in attachments {
            if attachment.is_externally_hosted() {
                continue;
            }
            match transfer_attachment(self, issue_key, attachment, source).await {
                Ok(()) => {
                    info!(issue = issue_key, file = %attachment.name, "uploaded attachment");
                    report.uploaded.push(attachment.name.clone());
                }
                Err(err) => {
                    warn!(issue = issue_key, file = %attachment.name, error = %err, "attachment failed");
                    report.failed.push(attachment.name.clone());
                }
            }
        }
        report
    }
}

async fn transfer_attachment<T>(
    tracker: &T,
    issue_key: &str,
    attachment: &AttachmentDescriptor,
    source: &dyn FileSource,
) -> AppResult<()>
where
    T: IssueTrackerService + ?Sized,
{
    let url = attachment.source_url.as_deref().ok_or_else(|| {
        AppError::Attachment(format!("{} has no download URL", attachment.name))
    })?;

    // Removed when dropped, whichever way this function returns.
    let scratch = tempfile::Builder::new()
        .prefix("ticket-bridge-")
        .suffix(&format!("_{}", scratch_suffix(&attachment.name)))
        .tempfile()?;

    let bytes = source.download_to(url, scratch.path()).await?;
    info!(file = %attachment.name, bytes, "downloaded attachment");
    tracker
        .upload_attachment(issue_key, &attachment.name, scratch.path())
        .await
}

fn scratch_suffix(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
