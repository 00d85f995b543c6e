use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::conversation::{AttachmentReport, transferable_count};
use crate::domain::draft::{DraftId, DraftRecord, MessageRef};
use crate::domain::lifecycle::{DraftState, Lifecycle, PipelineMode};
use crate::domain::ticket::{IssueRouting, IssueType, Priority, TITLE_MAX_CHARS, TicketDraft};
use crate::error::{AppError, AppResult};
use crate::render::messages::{self, CreatedSummary};
use crate::render::modal::review_modal;
use crate::text::{truncate_chars, truncate_for_display};
use crate::workflow::guard::{self, TaskOutcome};
use crate::workflow::{Trigger, extract, settle_indicator, synthesize};

/// Values entered in the review form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewForm {
    pub title: String,
    pub issue_type: String,
    pub priority: String,
    pub description: String,
    pub project_key: String,
    pub epic_key: Option<String>,
}

impl ReviewForm {
    /// Final ticket and routing; labels come from the stored draft since the
    /// form does not edit them.
    pub fn into_ticket(self, labels: Vec<String>) -> (TicketDraft, IssueRouting) {
        let routing = IssueRouting::new(&self.project_key, self.epic_key.as_deref());
        let ticket = TicketDraft {
            title: truncate_chars(self.title.trim(), TITLE_MAX_CHARS).to_string(),
            issue_type: IssueType::from_label(&self.issue_type).unwrap_or(IssueType::Story),
            priority: Priority::from_label(self.priority.trim()),
            description: self.description,
            labels,
        };
        (ticket, routing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub draft_id: DraftId,
    pub user_id: String,
    pub channel_id: String,
    pub trigger_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelRequest {
    pub draft_id: DraftId,
    pub user_id: String,
    pub status_message: MessageRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub draft_id: DraftId,
    pub user_id: String,
    pub form: ReviewForm,
}

/// Background half of a review trigger: extract, synthesize, store, notify.
pub async fn run_draft(ctx: Arc<AppContext>, trigger: Trigger, mut lifecycle: Lifecycle) -> TaskOutcome {
    info!(draft_id = %lifecycle.id(), "starting draft pipeline");
    let outcome = guard::boundary(
        "draft",
        prepare_draft(&ctx, &trigger, &mut lifecycle),
        |err| report_draft_failure(&ctx, &trigger, err),
    )
    .await;
    if outcome != TaskOutcome::Completed {
        lifecycle.fail();
    }
    outcome
}

async fn prepare_draft(
    ctx: &AppContext,
    trigger: &Trigger,
    lifecycle: &mut Lifecycle,
) -> AppResult<()> {
    let origin = &trigger.origin;
    let chat = ctx.chat.as_ref();

    let channel_name = chat.channel_name(&origin.channel).await?;
    let conversation = extract::extract_conversation(chat, origin).await?;
    let origin_link = chat.permalink(&origin.channel, &origin.ts).await?;

    lifecycle.advance(DraftState::Synthesizing)?;
    let ticket = synthesize::review_draft(
        ctx.language_model.as_ref(),
        &ctx.settings.review_model,
        &channel_name,
        &conversation.transcript,
    )
    .await?;

    let record = DraftRecord {
        id: trigger.draft_id(),
        ticket,
        origin_link,
        requesting_user_id: trigger.user_id.clone(),
        attachments: conversation.attachments,
        created_at: Utc::now(),
        status_message: None,
    };
    ctx.drafts.put(&record).await?;
    if ctx.drafts.get(&record.id).await?.is_none() {
        return Err(AppError::StoreInconsistency(record.id.to_string()));
    }
    info!(draft_id = %record.id, "verified stored draft");

    let status = chat
        .post_message(&trigger.user_id, &messages::draft_ready(&record))
        .await?;
    if !ctx.drafts.attach_status_message(&record.id, &status).await? {
        info!(draft_id = %record.id, "draft consumed before its status message was recorded");
    }

    lifecycle.advance(DraftState::AwaitingReview)?;
    settle_indicator(chat, origin, true).await;
    info!(draft_id = %record.id, "draft ready for review");
    Ok(())
}

async fn report_draft_failure(ctx: &AppContext, trigger: &Trigger, err: AppError) -> bool {
    settle_indicator(ctx.chat.as_ref(), &trigger.origin, false).await;
    let notice = messages::draft_failed(&truncate_for_display(&err));
    ctx.chat.post_message(&trigger.user_id, &notice).await.is_ok()
}

/// Opens the review form for a stored draft. A missing draft gets an
/// ephemeral hint instead.
pub async fn open_editor(ctx: &AppContext, request: EditRequest) -> AppResult<()> {
    info!(draft_id = %request.draft_id, "edit requested");
    let Some(record) = ctx.drafts.get(&request.draft_id).await? else {
        info!(draft_id = %request.draft_id, "draft not found for edit");
        ctx.chat
            .post_ephemeral(
                &request.channel_id,
                &request.user_id,
                messages::draft_missing_notice(),
            )
            .await?;
        return Ok(());
    };

    let mut lifecycle = Lifecycle::resume(
        request.draft_id.clone(),
        PipelineMode::Review,
        DraftState::AwaitingReview,
    );
    lifecycle.advance(DraftState::Editing)?;

    let view = review_modal(
        &record.id,
        &record.ticket,
        transferable_count(&record.attachments),
        &ctx.settings.routing,
    );
    ctx.chat.open_view(&request.trigger_id, &view).await?;
    info!(draft_id = %record.id, "review form opened");
    Ok(())
}

/// Deletes the draft and rewrites its notification to the cancelled state.
/// A draft that is already gone leaves the notification as it is.
pub async fn cancel(ctx: &AppContext, request: CancelRequest) -> AppResult<()> {
    let Some(removed) = ctx.drafts.pop_and_delete(&request.draft_id).await? else {
        info!(draft_id = %request.draft_id, "cancel for a draft that is already gone");
        return Ok(());
    };
    let mut lifecycle = Lifecycle::resume(
        request.draft_id.clone(),
        PipelineMode::Review,
        DraftState::AwaitingReview,
    );
    lifecycle.advance(DraftState::Cancelled)?;

    ctx.chat
        .update_message(&request.status_message, &messages::cancelled(&removed.ticket.title))
        .await?;
    info!(draft_id = %request.draft_id, user = %request.user_id, "draft cancelled");
    Ok(())
}

/// Consumes the draft and spawns issue creation. Returns `None` when the
/// draft was already taken by another submit or cancel.
pub async fn submit(
    ctx: &Arc<AppContext>,
    submission: Submission,
) -> AppResult<Option<JoinHandle<TaskOutcome>>> {
    let Submission {
        draft_id,
        user_id,
        form,
    } = submission;
    info!(draft_id = %draft_id, "review form submitted");

    let record = match ctx.drafts.pop_and_delete(&draft_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            info!(draft_id = %draft_id, "draft not found on submit");
            ctx.chat
                .post_message(&user_id, &messages::submission_missing())
                .await?;
            return Ok(None);
        }
        Err(err) => {
            let notice = messages::creation_failed(&truncate_for_display(&err));
            if let Err(notify_err) = ctx.chat.post_message(&user_id, &notice).await {
                warn!(error = %notify_err, "could not report store failure");
            }
            return Err(err);
        }
    };

    let mut lifecycle = Lifecycle::resume(draft_id, PipelineMode::Review, DraftState::Editing);
    let (ticket, routing) = form.into_ticket(record.ticket.labels.clone());
    lifecycle.advance(DraftState::Creating)?;

    if let Some(status) = &record.status_message {
        if let Err(err) = ctx
            .chat
            .update_message(status, &messages::creating(&ticket))
            .await
        {
            warn!(error = %err, "could not show creating state");
        }
    }

    let creation = ReviewedCreation {
        record,
        ticket,
        routing,
        user_id,
    };
    let ctx = Arc::clone(ctx);
    Ok(Some(guard::spawn(async move {
        run_creation(ctx, creation, lifecycle).await
    })))
}

struct ReviewedCreation {
    record: DraftRecord,
    ticket: TicketDraft,
    routing: IssueRouting,
    user_id: String,
}

async fn run_creation(
    ctx: Arc<AppContext>,
    creation: ReviewedCreation,
    mut lifecycle: Lifecycle,
) -> TaskOutcome {
    let outcome = guard::boundary(
        "create",
        create_reviewed(&ctx, &creation, &mut lifecycle),
        |err| report_creation_failure(&ctx, &creation.user_id, err),
    )
    .await;
    if outcome != TaskOutcome::Completed {
        lifecycle.fail();
    }
    outcome
}

async fn create_reviewed(
    ctx: &AppContext,
    creation: &ReviewedCreation,
    lifecycle: &mut Lifecycle,
) -> AppResult<()> {
    let ReviewedCreation {
        record,
        ticket,
        routing,
        user_id,
    } = creation;

    let issue = ctx
        .issue_tracker
        .create_issue(ticket, &record.origin_link, routing)
        .await?;

    let transferable = transferable_count(&record.attachments);
    let report = if transferable > 0 {
        lifecycle.advance(DraftState::Attaching)?;
        if let Some(status) = &record.status_message {
            let uploading = messages::uploading(&issue, &ticket.title, transferable);
            if let Err(err) = ctx.chat.update_message(status, &uploading).await {
                warn!(error = %err, "could not show upload progress");
            }
        }
        ctx.issue_tracker
            .attach_files(&issue.key, &record.attachments, ctx.files.as_ref())
            .await
    } else {
        AttachmentReport::default()
    };
    lifecycle.advance(DraftState::Complete)?;

    let summary = messages::created(&CreatedSummary {
        issue: &issue,
        title: &ticket.title,
        issue_type: ticket.issue_type,
        priority: &ticket.priority,
        routing,
        attachments: &report,
    });
    let rewritten = match &record.status_message {
        Some(status) => match ctx.chat.update_message(status, &summary).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "could not rewrite draft message");
                false
            }
        },
        None => false,
    };
    if !rewritten {
        ctx.chat
            .post_message(user_id, &messages::created_fallback(&issue, &report))
            .await?;
    }

    info!(
        key = %issue.key,
        uploaded = report.uploaded.len(),
        failed = report.failed.len(),
        "ticket created"
    );
    Ok(())
}

async fn report_creation_failure(ctx: &AppContext, user_id: &str, err: AppError) -> bool {
    let notice = messages::creation_failed(&truncate_for_display(&err));
    ctx.chat.post_message(user_id, &notice).await.is_ok()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::conversation::ThreadMessage;
    use crate::render::{CANCEL_ACTION_ID, EDIT_ACTION_ID};
    use crate::services::DraftStore;
    use crate::testing::{ChatCall, Harness, StaticFiles, hosted_file, test_settings};
    use crate::workflow::{FAILURE_REACTION, SUCCESS_REACTION, WORKING_REACTION};

    fn trigger() -> Trigger {
        Trigger {
            origin: MessageRef::new("C1", "1700.1"),
            user_id: "U1".to_string(),
        }
    }

    fn started() -> Lifecycle {
        let mut lifecycle = Lifecycle::start(trigger().draft_id(), PipelineMode::Review);
        lifecycle.advance(DraftState::Extracting).expect("extracting");
        lifecycle
    }

    fn thread() -> Vec<ThreadMessage> {
        ["login fails", "since this morning", "same for me"]
            .iter()
            .enumerate()
            .map(|(index, text)| ThreadMessage {
                user_id: Some(format!("U{}", index % 2 + 1)),
                text: text.to_string(),
                files: Vec::new(),
            })
            .collect()
    }

    /// Accepts writes but never has anything to read back.
    struct ForgetfulStore;

    #[async_trait]
    impl DraftStore for ForgetfulStore {
        async fn put(&self, _record: &DraftRecord) -> AppResult<()> {
            Ok(())
        }

        async fn get(&self, _id: &DraftId) -> AppResult<Option<DraftRecord>> {
            Ok(None)
        }

        async fn pop_and_delete(&self, _id: &DraftId) -> AppResult<Option<DraftRecord>> {
            Ok(None)
        }

        async fn attach_status_message(&self, _id: &DraftId, _status: &MessageRef) -> AppResult<bool> {
            Ok(false)
        }

        async fn pending_ids(&self) -> AppResult<Vec<DraftId>> {
            Ok(Vec::new())
        }
    }

    fn form(title: &str, issue_type: &str, priority: &str) -> ReviewForm {
        ReviewForm {
            title: title.to_string(),
            issue_type: issue_type.to_string(),
            priority: priority.to_string(),
            description: "h2. Steps".to_string(),
            project_key: "GOD".to_string(),
            epic_key: Some("GOD-26345".to_string()),
        }
    }

    #[tokio::test]
    async fn draft_pipeline_stores_record_and_notifies_requester() {
        let harness = Harness::new();
        harness.chat.set_thread(thread());
        harness.model.reply(
            r#"{"title":"Login broken","description":"h2. Context","issue_type":"Bug","priority":"Highest","labels":["auth"]}"#,
        );

        let outcome = run_draft(harness.ctx(), trigger(), started()).await;
        assert_eq!(outcome, TaskOutcome::Completed);

        let record = harness
            .drafts
            .get(&DraftId::new("C1", "1700.1"))
            .await
            .expect("get")
            .expect("stored");
        assert_eq!(record.ticket.priority, Priority::NeedsPriority);
        assert_eq!(record.origin_link, "https://chat.example/C1/1700.1");
        assert_eq!(record.status_message, Some(harness.chat.message_ref_of(0)));

        let posts = harness.chat.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "U1");
        assert_eq!(posts[0].1.action_ids(), vec![EDIT_ACTION_ID, CANCEL_ACTION_ID]);

        let origin = MessageRef::new("C1", "1700.1");
        let calls = harness.chat.calls();
        assert!(calls.contains(&ChatCall::RemoveReaction(origin.clone(), WORKING_REACTION.to_string())));
        assert!(calls.contains(&ChatCall::AddReaction(origin, SUCCESS_REACTION.to_string())));
    }

    #[tokio::test]
    async fn synthesis_failure_marks_failure_and_stores_nothing() {
        let harness = Harness::new();
        harness.chat.set_thread(thread());
        harness.model.reply("not json at all");

        let outcome = run_draft(harness.ctx(), trigger(), started()).await;
        assert_eq!(outcome, TaskOutcome::Failed { reported: true });

        assert!(harness.drafts.pending_ids().await.expect("ids").is_empty());
        let posts = harness.chat.posts();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].1.text.starts_with("❌ Error generating ticket: "));
        assert!(harness.chat.calls().contains(&ChatCall::AddReaction(
            MessageRef::new("C1", "1700.1"),
            FAILURE_REACTION.to_string()
        )));
    }

    #[tokio::test]
    async fn draft_consumed_while_notifying_stays_consumed() {
        let harness = Harness::new();
        harness.chat.set_thread(thread());
        harness.model.reply(
            r#"{"title":"Login broken","description":"h2. Context","issue_type":"Bug","labels":[]}"#,
        );
        let id = DraftId::new("C1", "1700.1");
        harness
            .chat
            .consume_draft_on_next_post(harness.drafts.clone(), id.clone());

        let outcome = run_draft(harness.ctx(), trigger(), started()).await;

        assert_eq!(outcome, TaskOutcome::Completed);
        assert_eq!(harness.drafts.get(&id).await.expect("get"), None);
        assert!(harness.drafts.pending_ids().await.expect("ids").is_empty());
    }

    #[tokio::test]
    async fn unreadable_stored_draft_is_reported_without_controls() {
        let harness = Harness::new();
        harness.chat.set_thread(thread());
        harness.model.reply(
            r#"{"title":"Login broken","description":"h2. Context","issue_type":"Bug","labels":[]}"#,
        );
        let ctx = Arc::new(AppContext::new(
            test_settings(),
            harness.chat.clone(),
            Arc::new(StaticFiles),
            harness.model.clone(),
            harness.tracker.clone(),
            Arc::new(ForgetfulStore),
        ));

        let outcome = run_draft(ctx, trigger(), started()).await;
        assert_eq!(outcome, TaskOutcome::Failed { reported: true });

        let posts = harness.chat.posts();
        assert_eq!(posts.len(), 1);
        assert!(posts[0].1.text.starts_with("❌ Error generating ticket: "));
        assert!(posts[0].1.text.contains("was not readable after it was stored"));
        assert!(posts.iter().all(|(_, message)| message.action_ids().is_empty()));
        assert!(harness.chat.calls().contains(&ChatCall::AddReaction(
            MessageRef::new("C1", "1700.1"),
            FAILURE_REACTION.to_string()
        )));
    }

    #[tokio::test]
    async fn unreportable_failure_still_ends_the_task() {
        let harness = Harness::new();
        harness.chat.fail_channel_lookup();
        harness.chat.fail_posts();

        let outcome = run_draft(harness.ctx(), trigger(), started()).await;
        assert_eq!(outcome, TaskOutcome::Failed { reported: false });
    }

    #[tokio::test]
    async fn edit_opens_prefilled_form() {
        let harness = Harness::new();
        let record = harness.seed_draft("C1", "1700.1", vec![hosted_file("a.png")]).await;

        open_editor(
            &harness.ctx(),
            EditRequest {
                draft_id: record.id.clone(),
                user_id: "U1".to_string(),
                channel_id: "D1".to_string(),
                trigger_id: "trig-1".to_string(),
            },
        )
        .await
        .expect("edit");

        let views = harness.chat.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].0, "trig-1");
        assert_eq!(views[0].1.callback_id, "approve_ticket_C1_1700.1");
    }

    #[tokio::test]
    async fn cancel_removes_draft_and_strikes_title() {
        let harness = Harness::new();
        let record = harness.seed_draft("C1", "1700.1", Vec::new()).await;
        let status = record.status_message.clone().expect("status");

        cancel(
            &harness.ctx(),
            CancelRequest {
                draft_id: record.id.clone(),
                user_id: "U1".to_string(),
                status_message: status.clone(),
            },
        )
        .await
        .expect("cancel");

        assert_eq!(harness.drafts.get(&record.id).await.expect("get"), None);
        let updates = harness.chat.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, status);
        assert!(updates[0].1.rendered_text().contains(&format!("~{}~", record.ticket.title)));
        assert!(updates[0].1.action_ids().is_empty());
    }

    #[tokio::test]
    async fn cancel_after_consumption_leaves_notification_alone() {
        let harness = Harness::new();
        let record = harness.seed_draft("C1", "1700.1", Vec::new()).await;
        let status = record.status_message.clone().expect("status");
        harness.drafts.pop_and_delete(&record.id).await.expect("consume");

        cancel(
            &harness.ctx(),
            CancelRequest {
                draft_id: record.id.clone(),
                user_id: "U1".to_string(),
                status_message: status,
            },
        )
        .await
        .expect("cancel");

        assert!(harness.chat.updates().is_empty());
        assert!(harness.chat.posts().is_empty());
    }

    #[tokio::test]
    async fn submit_creates_issue_and_rewrites_notification() {
        let harness = Harness::new();
        let record = harness.seed_draft("C1", "1700.1", Vec::new()).await;
        let status = record.status_message.clone().expect("status");

        let handle = submit(
            &harness.ctx(),
            Submission {
                draft_id: record.id.clone(),
                user_id: "U1".to_string(),
                form: form("Fix login bug", "Bug", "High"),
            },
        )
        .await
        .expect("submit")
        .expect("spawned");
        assert_eq!(handle.await.expect("join"), TaskOutcome::Completed);

        let created = harness.tracker.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].ticket.title, "Fix login bug");
        assert_eq!(created[0].ticket.issue_type, IssueType::Bug);
        assert_eq!(created[0].ticket.priority.tracker_name(), "P1 - High Priority");
        assert_eq!(created[0].ticket.labels, record.ticket.labels);
        assert_eq!(created[0].origin_link, record.origin_link);

        let updates = harness.chat.updates();
        assert!(updates.iter().all(|(target, _)| *target == status));
        let last = &updates.last().expect("final update").1;
        assert!(last.rendered_text().contains("<https://jira.example/browse/GOD-42|GOD-42>"));
        assert!(harness.drafts.get(&record.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn second_submit_finds_nothing() {
        let harness = Harness::new();
        let record = harness.seed_draft("C1", "1700.1", Vec::new()).await;
        let submission = Submission {
            draft_id: record.id.clone(),
            user_id: "U1".to_string(),
            form: form("Fix login bug", "Bug", "High"),
        };

        let first = submit(&harness.ctx(), submission.clone()).await.expect("first");
        let second = submit(&harness.ctx(), submission).await.expect("second");
        assert!(first.is_some());
        assert!(second.is_none());
        first.expect("handle").await.expect("join");

        assert_eq!(harness.tracker.created().len(), 1);
        assert!(harness
            .chat
            .posts()
            .iter()
            .any(|(_, message)| message.text == "❌ Ticket data not found. Please try again."));
    }

    #[tokio::test]
    async fn uploads_files_and_lists_outcome() {
        let harness = Harness::new();
        let mut external = hosted_file("roadmap.gdoc");
        external.transfer_mode = Some("external".to_string());
        let record = harness
            .seed_draft(
                "C1",
                "1700.1",
                vec![hosted_file("a.png"), hosted_file("big.mov"), external],
            )
            .await;
        harness.tracker.fail_upload_of("big.mov");

        let handle = submit(
            &harness.ctx(),
            Submission {
                draft_id: record.id.clone(),
                user_id: "U1".to_string(),
                form: form("Fix login bug", "Bug", "High"),
            },
        )
        .await
        .expect("submit")
        .expect("spawned");
        assert_eq!(handle.await.expect("join"), TaskOutcome::Completed);

        assert_eq!(harness.tracker.uploaded(), vec!["a.png"]);
        let updates = harness.chat.updates();
        assert!(updates
            .iter()
            .any(|(_, message)| message.text == "Uploading 2 file(s) to GOD-42..."));
        let last = updates.last().expect("final").1.rendered_text();
        assert!(last.contains("📎 1 file(s) attached | ⚠️ 1 failed"));
        assert!(last.contains("*Failed to attach:* big.mov"));
    }

    #[tokio::test]
    async fn rewrite_failure_falls_back_to_new_message() {
        let harness = Harness::new();
        let record = harness.seed_draft("C1", "1700.1", Vec::new()).await;
        harness.chat.fail_updates();

        let handle = submit(
            &harness.ctx(),
            Submission {
                draft_id: record.id.clone(),
                user_id: "U1".to_string(),
                form: form("Fix login bug", "Bug", "High"),
            },
        )
        .await
        .expect("submit")
        .expect("spawned");
        assert_eq!(handle.await.expect("join"), TaskOutcome::Completed);

        let posts = harness.chat.posts();
        assert!(posts
            .iter()
            .any(|(channel, message)| channel == "U1" && message.text.starts_with("✅ *Ticket Created:*")));
    }

    #[tokio::test]
    async fn tracker_rejection_is_reported_to_submitter() {
        let harness = Harness::new();
        let record = harness.seed_draft("C1", "1700.1", Vec::new()).await;
        harness.tracker.reject_creates("Jira API error: 400 - bad field");

        let handle = submit(
            &harness.ctx(),
            Submission {
                draft_id: record.id.clone(),
                user_id: "U7".to_string(),
                form: form("Fix login bug", "Bug", "High"),
            },
        )
        .await
        .expect("submit")
        .expect("spawned");
        assert_eq!(handle.await.expect("join"), TaskOutcome::Failed { reported: true });

        let posts = harness.chat.posts();
        assert!(posts.iter().any(|(channel, message)| channel == "U7"
            && message.text.starts_with("❌ Failed to create ticket: ")
            && message.text.contains("400 - bad field")));
    }

    #[test]
    fn form_falls_back_for_unknown_type_and_blank_epic() {
        let mut values = form("  Title  ", "Epic", "Urgent");
        values.epic_key = Some("   ".to_string());
        let (ticket, routing) = values.into_ticket(vec!["a".to_string()]);
        assert_eq!(ticket.title, "Title");
        assert_eq!(ticket.issue_type, IssueType::Story);
        assert_eq!(ticket.priority, Priority::Other("Urgent".to_string()));
        assert_eq!(routing.epic_key, None);
        assert_eq!(ticket.labels, vec!["a"]);
    }
}
