pub mod auto;
pub mod extract;
pub mod guard;
pub mod review;
pub mod synthesize;

use tracing::debug;

use crate::domain::draft::{DraftId, MessageRef};
use crate::services::ChatService;

pub const WORKING_REACTION: &str = "hourglass_flowing_sand";
pub const SUCCESS_REACTION: &str = "white_check_mark";
pub const FAILURE_REACTION: &str = "x";

/// A trigger reaction on a message: who reacted, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub origin: MessageRef,
    pub user_id: String,
}

impl Trigger {
    pub fn draft_id(&self) -> DraftId {
        DraftId::new(&self.origin.channel, &self.origin.ts)
    }
}

pub async fn mark_working(chat: &dyn ChatService, origin: &MessageRef) {
    if let Err(err) = chat.add_reaction(origin, WORKING_REACTION).await {
        debug!(error = %err, "could not add working reaction");
    }
}

/// Swaps the working indicator for the success or failure one.
pub async fn settle_indicator(chat: &dyn ChatService, origin: &MessageRef, succeeded: bool) {
    if let Err(err) = chat.remove_reaction(origin, WORKING_REACTION).await {
        debug!(error = %err, "could not remove working reaction");
    }
    let name = if succeeded {
        SUCCESS_REACTION
    } else {
        FAILURE_REACTION
    };
    if let Err(err) = chat.add_reaction(origin, name).await {
        debug!(error = %err, reaction = name, "could not add result reaction");
    }
}
