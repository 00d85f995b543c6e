use crate::domain::conversation::AttachmentReport;
use crate::domain::draft::{DraftId, DraftRecord};
use crate::domain::ticket::{CreatedIssue, IssueRouting, IssueType, Priority, TicketDraft};
use crate::render::blocks::{ActionElement, Block, ButtonStyle, OutboundMessage, TextObject};
use crate::render::{CANCEL_ACTION_ID, EDIT_ACTION_ID};

pub fn draft_ready(record: &DraftRecord) -> OutboundMessage {
    let ticket = &record.ticket;
    OutboundMessage::with_blocks(
        format!("New ticket draft: {}", ticket.title),
        vec![
            Block::text(format!("*🎫 New Ticket Draft*\n\n*{}*", ticket.title)),
            Block::fields([
                format!("*Type:* {}", ticket.issue_type),
                format!("*Priority:* {}", ticket.priority),
                format!("*Files:* {}", record.attachments.len()),
            ]),
            review_controls(&record.id),
        ],
    )
}

fn review_controls(id: &DraftId) -> Block {
    Block::Actions {
        elements: vec![
            ActionElement::Button {
                text: TextObject::plain("✅ Review & Create"),
                action_id: EDIT_ACTION_ID.to_string(),
                value: id.to_string(),
                style: Some(ButtonStyle::Primary),
            },
            ActionElement::Button {
                text: TextObject::plain("❌ Cancel"),
                action_id: CANCEL_ACTION_ID.to_string(),
                value: id.to_string(),
                style: Some(ButtonStyle::Danger),
            },
        ],
    }
}

pub fn cancelled(title: &str) -> OutboundMessage {
    OutboundMessage::with_blocks(
        "🚫 Ticket Cancelled",
        vec![
            Block::text(format!("*🚫 Ticket Cancelled*\n\n~{title}~")),
            Block::context("React with 🎫 again to create a new draft"),
        ],
    )
}

pub fn creating(ticket: &TicketDraft) -> OutboundMessage {
    OutboundMessage::with_blocks(
        format!("Creating ticket: {}", ticket.title),
        vec![
            Block::text(format!("*⏳ Creating Ticket...*\n\n*{}*", ticket.title)),
            Block::fields([
                format!("*Type:* {}", ticket.issue_type),
                format!("*Priority:* {}", ticket.priority),
            ]),
            Block::context("Please wait..."),
        ],
    )
}

pub fn uploading(issue: &CreatedIssue, title: &str, file_count: usize) -> OutboundMessage {
    OutboundMessage::with_blocks(
        format!("Uploading {file_count} file(s) to {}...", issue.key),
        vec![
            Block::text(format!("*✅ {} Created!*\n\n*{title}*", issue.key)),
            Block::context(format!("📎 Uploading {file_count} file(s)...")),
        ],
    )
}

/// Everything the final "created" notification shows.
pub struct CreatedSummary<'a> {
    pub issue: &'a CreatedIssue,
    pub title: &'a str,
    pub issue_type: IssueType,
    pub priority: &'a Priority,
    pub routing: &'a IssueRouting,
    pub attachments: &'a AttachmentReport,
}

pub fn created(summary: &CreatedSummary<'_>) -> OutboundMessage {
    let issue = summary.issue;
    let mut blocks = vec![
        Block::text(format!(
            "*✅ Ticket Created*\n\n*<{}|{}>*: {}",
            issue.url, issue.key, summary.title
        )),
        Block::fields([
            format!("*Type:* {}", summary.issue_type),
            format!("*Priority:* {}", summary.priority),
            format!("*Project:* {}", summary.routing.project_key),
            format!("*Epic:* {}", summary.routing.epic_label()),
        ]),
        Block::context(summary.attachments.summary_line()),
    ];
    if !summary.attachments.is_empty() {
        blocks.push(Block::context(summary.attachments.detail_lines().trim()));
    }
    OutboundMessage::with_blocks(format!("Ticket Created: {}", issue.key), blocks)
}

/// Stand-alone message used when the draft notification cannot be rewritten.
pub fn created_fallback(issue: &CreatedIssue, attachments: &AttachmentReport) -> OutboundMessage {
    OutboundMessage::plain(format!(
        "✅ *Ticket Created:* <{}|{}>{}",
        issue.url,
        issue.key,
        attachments.detail_lines()
    ))
}

pub fn draft_failed(error: &str) -> OutboundMessage {
    OutboundMessage::plain(format!("❌ Error generating ticket: {error}"))
}

pub fn creation_failed(error: &str) -> OutboundMessage {
    OutboundMessage::plain(format!("❌ Failed to create ticket: {error}"))
}

pub fn draft_missing_notice() -> &'static str {
    "⚠️ Ticket not found. Please react with 🎫 again to generate a new draft."
}

pub fn submission_missing() -> OutboundMessage {
    OutboundMessage::plain("❌ Ticket data not found. Please try again.")
}

/// Progress states of the auto-create notification before the issue exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoStage<'a> {
    Analyzing,
    Generating,
    CreatingIssue { title: &'a str },
}

pub fn auto_progress(stage: AutoStage<'_>) -> OutboundMessage {
    let (text, detail) = match stage {
        AutoStage::Analyzing => (
            "🎫 Creating ticket...".to_string(),
            "Analyzing conversation...".to_string(),
        ),
        AutoStage::Generating => (
            "Generating ticket...".to_string(),
            "Generating title and description...".to_string(),
        ),
        AutoStage::CreatingIssue { title } => (
            "Creating in Jira...".to_string(),
            format!("*{title}*\n\nCreating in Jira..."),
        ),
    };
    OutboundMessage::with_blocks(
        text,
        vec![Block::text(format!("*⏳ Creating Jira Ticket...*\n\n{detail}"))],
    )
}

pub fn auto_failed(error: &str) -> OutboundMessage {
    OutboundMessage::with_blocks(
        format!("❌ Failed: {error}"),
        vec![
            Block::text(format!("*❌ Failed to Create Ticket*\n\n{error}")),
            Block::context("Please try again or create manually"),
        ],
    )
}
