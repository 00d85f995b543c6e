use tracing::info;

use crate::domain::draft::DraftId;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    Review,
    Auto,
}

impl PipelineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineMode::Review => "review",
            PipelineMode::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Triggered,
    Extracting,
    Synthesizing,
    AwaitingReview,
    Editing,
    Creating,
    Attaching,
    Complete,
    Cancelled,
    Failed,
}

impl DraftState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftState::Triggered => "triggered",
            DraftState::Extracting => "extracting",
            DraftState::Synthesizing => "synthesizing",
            DraftState::AwaitingReview => "awaiting_review",
            DraftState::Editing => "editing",
            DraftState::Creating => "creating",
            DraftState::Attaching => "attaching",
            DraftState::Complete => "complete",
            DraftState::Cancelled => "cancelled",
            DraftState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DraftState::Complete | DraftState::Cancelled | DraftState::Failed
        )
    }

    pub fn can_transition_to(&self, next: DraftState, mode: PipelineMode) -> bool {
        use DraftState::*;

        if self.is_terminal() {
            return false;
        }
        if next == Failed {
            return true;
        }
        match (mode, self, next) {
            (_, Triggered, Extracting) => true,
            (_, Extracting, Synthesizing) => true,
            (PipelineMode::Review, Synthesizing, AwaitingReview) => true,
            (PipelineMode::Review, AwaitingReview, Editing) => true,
            (PipelineMode::Review, Editing, AwaitingReview) => true,
            (PipelineMode::Review, AwaitingReview, Cancelled) => true,
            (PipelineMode::Review, Editing, Creating) => true,
            (PipelineMode::Auto, Synthesizing, Creating) => true,
            (_, Creating, Attaching) => true,
            (_, Creating, Complete) => true,
            (_, Attaching, Complete) => true,
            _ => false,
        }
    }
}

/// Tracks one trigger through its states. Review-mode handlers resume a
/// lifecycle at the state implied by the action they serve.
#[derive(Debug)]
pub struct Lifecycle {
    id: DraftId,
    mode: PipelineMode,
    state: DraftState,
}

impl Lifecycle {
    pub fn start(id: DraftId, mode: PipelineMode) -> Self {
        Self::resume(id, mode, DraftState::Triggered)
    }

    pub fn resume(id: DraftId, mode: PipelineMode, state: DraftState) -> Self {
        Self { id, mode, state }
    }

    pub fn id(&self) -> &DraftId {
        &self.id
    }

    pub fn state(&self) -> DraftState {
        self.state
    }

    pub fn advance(&mut self, next: DraftState) -> AppResult<()> {
        if !self.state.can_transition_to(next, self.mode) {
            return Err(AppError::InvalidTransition {
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        info!(
            draft_id = %self.id,
            mode = self.mode.as_str(),
            from = self.state.as_str(),
            to = next.as_str(),
            "draft transition"
        );
        self.state = next;
        Ok(())
    }

    /// Moves to `Failed` unless the lifecycle already ended.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            info!(
                draft_id = %self.id,
                mode = self.mode.as_str(),
                from = self.state.as_str(),
                "draft failed"
            );
            self.state = DraftState::Failed;
        }
    }
}
