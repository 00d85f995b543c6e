use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::conversation::{AttachmentReport, transferable_count};
use crate::domain::draft::MessageRef;
use crate::domain::lifecycle::{DraftState, Lifecycle};
use crate::domain::ticket::{IssueType, Priority, TicketDraft};
use crate::error::{AppError, AppResult};
use crate::render::messages::{self, AutoStage, CreatedSummary};
use crate::text::truncate_for_display;
use crate::workflow::guard::{self, TaskOutcome};
use crate::workflow::{Trigger, extract, settle_indicator, synthesize};

/// Background half of an auto trigger: the ticket is created straight from
/// the model output, with progress shown in one direct message.
pub async fn run(ctx: Arc<AppContext>, trigger: Trigger, mut lifecycle: Lifecycle) -> TaskOutcome {
    info!(draft_id = %lifecycle.id(), "starting auto pipeline");
    let progress = OnceLock::new();
    let outcome = guard::boundary(
        "auto",
        create_ticket(&ctx, &trigger, &progress, &mut lifecycle),
        |err| report_failure(&ctx, &trigger, progress.get(), err),
    )
    .await;
    if outcome != TaskOutcome::Completed {
        lifecycle.fail();
    }
    outcome
}

async fn create_ticket(
    ctx: &AppContext,
    trigger: &Trigger,
    progress: &OnceLock<MessageRef>,
    lifecycle: &mut Lifecycle,
) -> AppResult<()> {
    let chat = ctx.chat.as_ref();
    let origin = &trigger.origin;

    let status = chat
        .post_message(&trigger.user_id, &messages::auto_progress(AutoStage::Analyzing))
        .await?;
    let status = progress.get_or_init(|| status);

    let channel_name = chat.channel_name(&origin.channel).await?;
    let conversation = extract::extract_conversation(chat, origin).await?;
    let origin_link = chat.permalink(&origin.channel, &origin.ts).await?;

    lifecycle.advance(DraftState::Synthesizing)?;
    chat.update_message(status, &messages::auto_progress(AutoStage::Generating))
        .await?;
    let summary = synthesize::auto_summary(
        ctx.language_model.as_ref(),
        &ctx.settings.auto_model,
        &channel_name,
        &conversation.transcript,
    )
    .await?;

    lifecycle.advance(DraftState::Creating)?;
    let stage = AutoStage::CreatingIssue {
        title: &summary.title,
    };
    chat.update_message(status, &messages::auto_progress(stage))
        .await?;

    let ticket = TicketDraft {
        title: summary.title,
        description: summary.description,
        issue_type: IssueType::Story,
        priority: Priority::NeedsPriority,
        labels: Vec::new(),
    };
    let routing = &ctx.settings.routing;
    let issue = ctx
        .issue_tracker
        .create_issue(&ticket, &origin_link, routing)
        .await?;

    let transferable = transferable_count(&conversation.attachments);
    let report = if transferable > 0 {
        lifecycle.advance(DraftState::Attaching)?;
        let uploading = messages::uploading(&issue, &ticket.title, transferable);
        if let Err(err) = chat.update_message(status, &uploading).await {
            warn!(error = %err, "could not show upload progress");
        }
        ctx.issue_tracker
            .attach_files(&issue.key, &conversation.attachments, ctx.files.as_ref())
            .await
    } else {
        AttachmentReport::default()
    };
    lifecycle.advance(DraftState::Complete)?;

    let created = messages::created(&CreatedSummary {
        issue: &issue,
        title: &ticket.title,
        issue_type: ticket.issue_type,
        priority: &ticket.priority,
        routing,
        attachments: &report,
    });
    if let Err(err) = chat.update_message(status, &created).await {
        warn!(error = %err, "could not rewrite progress message");
        chat.post_message(&trigger.user_id, &messages::created_fallback(&issue, &report))
            .await?;
    }

    settle_indicator(chat, origin, true).await;
    info!(key = %issue.key, uploaded = report.uploaded.len(), "auto ticket created");
    Ok(())
}

async fn report_failure(
    ctx: &AppContext,
    trigger: &Trigger,
    progress: Option<&MessageRef>,
    err: AppError,
) -> bool {
    let error = truncate_for_display(&err);
    let reported = match progress {
        Some(status) => ctx
            .chat
            .update_message(status, &messages::auto_failed(&error))
            .await
            .is_ok(),
        None => ctx
            .chat
            .post_message(&trigger.user_id, &messages::creation_failed(&error))
            .await
            .is_ok(),
    };
    settle_indicator(ctx.chat.as_ref(), &trigger.origin, false).await;
    reported
}
