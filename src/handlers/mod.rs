//! Entry point for everything the chat platform pushes at us.

pub mod events;
pub mod reaction;

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::guard::TaskOutcome;
use crate::workflow::review;

use self::events::Inbound;

/// Socket Mode envelope types the bridge acts on.
pub const EVENTS_API: &str = "events_api";
pub const INTERACTIVE: &str = "interactive";

/// Routes one acknowledged envelope. Failures are logged here and never
/// reach the connection loop. Returns the background task, if one was
/// started.
pub async fn dispatch(
    ctx: &Arc<AppContext>,
    kind: &str,
    payload: Value,
) -> Option<JoinHandle<TaskOutcome>> {
    let inbound = match kind {
        EVENTS_API => events::parse_event(payload),
        INTERACTIVE => events::parse_interaction(payload),
        other => {
            debug!(kind = other, "ignoring envelope");
            return None;
        }
    };
    match handle(ctx, inbound).await {
        Ok(task) => task,
        Err(err) => {
            warn!(kind, error = %err, "could not handle envelope");
            None
        }
    }
}

async fn handle(
    ctx: &Arc<AppContext>,
    inbound: AppResult<Inbound>,
) -> AppResult<Option<JoinHandle<TaskOutcome>>> {
    match inbound? {
        Inbound::Reaction { trigger, reaction } => {
            reaction::on_reaction(ctx, trigger, &reaction).await
        }
        Inbound::Edit(request) => review::open_editor(ctx, request).await.map(|()| None),
        Inbound::Cancel(request) => review::cancel(ctx, request).await.map(|()| None),
        Inbound::Submit(submission) => review::submit(ctx, submission).await,
        Inbound::Ignored(reason) => {
            debug!(%reason, "ignoring payload");
            Ok(None)
        }
    }
}
