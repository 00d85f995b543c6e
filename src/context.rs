use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{AppConfig, TriggerRoutes};
use crate::domain::draft::DraftId;
use crate::domain::ticket::IssueRouting;
use crate::error::AppResult;
use crate::services::{
    ChatService, DraftStore, FileSource, IssueTrackerService, LanguageModelService,
};
use crate::workflow::synthesize::ModelChoice;

/// Runtime knobs the pipelines read.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub routing: IssueRouting,
    pub review_model: ModelChoice,
    pub auto_model: ModelChoice,
    pub triggers: TriggerRoutes,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            routing: config.default_routing(),
            review_model: config.review_model(),
            auto_model: config.auto_model(),
            triggers: config.trigger_routes()?,
        })
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub settings: PipelineSettings,
    pub chat: Arc<dyn ChatService>,
    pub files: Arc<dyn FileSource>,
    pub language_model: Arc<dyn LanguageModelService>,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub drafts: Arc<dyn DraftStore>,
    pub in_flight: Arc<InFlight>,
}

impl AppContext {
    pub fn new(
        settings: PipelineSettings,
        chat: Arc<dyn ChatService>,
        files: Arc<dyn FileSource>,
        language_model: Arc<dyn LanguageModelService>,
        issue_tracker: Arc<dyn IssueTrackerService>,
        drafts: Arc<dyn DraftStore>,
    ) -> Self {
        Self {
            settings,
            chat,
            files,
            language_model,
            issue_tracker,
            drafts,
            in_flight: Arc::new(InFlight::default()),
        }
    }
}

/// Draft ids whose trigger pipeline is currently running.
#[derive(Debug, Default)]
pub struct InFlight {
    ids: Mutex<HashSet<DraftId>>,
}

impl InFlight {
    /// Claims `id` until the returned guard drops; `None` if already claimed.
    pub fn try_claim(self: &Arc<Self>, id: &DraftId) -> Option<InFlightClaim> {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id.clone()) {
            return None;
        }
        Some(InFlightClaim {
            registry: Arc::clone(self),
            id: id.clone(),
        })
    }

    #[cfg(test)]
    pub fn contains(&self, id: &DraftId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

#[derive(Debug)]
pub struct InFlightClaim {
    registry: Arc<InFlight>,
    id: DraftId,
}

impl Drop for InFlightClaim {
    fn drop(&mut self) {
        self.registry
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
