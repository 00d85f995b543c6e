use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::domain::lifecycle::{DraftState, Lifecycle, PipelineMode};
use crate::error::AppResult;
use crate::workflow::guard::{self, TaskOutcome};
use crate::workflow::{Trigger, auto, mark_working, review};

/// Starts the pipeline bound to `reaction`, if any. The working indicator is
/// placed before the background task is spawned.
pub async fn on_reaction(
    ctx: &Arc<AppContext>,
    trigger: Trigger,
    reaction: &str,
) -> AppResult<Option<JoinHandle<TaskOutcome>>> {
    let Some(mode) = ctx.settings.triggers.mode_for(reaction) else {
        debug!(reaction, "reaction is not a trigger");
        return Ok(None);
    };

    let id = trigger.draft_id();
    let Some(claim) = ctx.in_flight.try_claim(&id) else {
        info!(draft_id = %id, "pipeline already running for this message; ignoring trigger");
        return Ok(None);
    };
    info!(draft_id = %id, reaction, mode = mode.as_str(), user = %trigger.user_id, "trigger received");

    let mut lifecycle = Lifecycle::start(id, mode);
    mark_working(ctx.chat.as_ref(), &trigger.origin).await;
    lifecycle.advance(DraftState::Extracting)?;

    let ctx = Arc::clone(ctx);
    Ok(Some(guard::spawn(async move {
        let _claim = claim;
        match mode {
            PipelineMode::Review => review::run_draft(ctx, trigger, lifecycle).await,
            PipelineMode::Auto => auto::run(ctx, trigger, lifecycle).await,
        }
    })))
}
