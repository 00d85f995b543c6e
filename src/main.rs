mod config;
mod context;
mod domain;
mod error;
mod handlers;
mod infra;
mod render;
mod services;
mod store;
#[cfg(test)]
mod testing;
mod text;
mod workflow;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::context::{AppContext, PipelineSettings};
use crate::error::AppResult;
use crate::infra::jira::JiraClient;
use crate::infra::llm::GeminiClient;
use crate::infra::slack::SlackClient;
use crate::infra::socket::SocketModeRunner;
use crate::services::DraftStore;
use crate::store::JsonFileDraftStore;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let config = AppConfig::load()?;
    init_tracing();

    let settings = PipelineSettings::from_config(&config)?;
    let slack = Arc::new(SlackClient::new(
        &config.slack_api_base,
        &config.slack_bot_token,
        &config.slack_app_token,
        config.slack_request_timeout(),
    )?);
    let language_model = Arc::new(GeminiClient::new(
        &config.gemini_api_base,
        &config.google_api_key,
    ));
    let issue_tracker = Arc::new(JiraClient::new(
        &config.jira_base_url,
        &config.jira_email,
        &config.jira_api_token,
        &config.jira_epic_link_field,
    ));
    let drafts = Arc::new(JsonFileDraftStore::open(&config.data_dir)?);

    let pending = drafts.pending_ids().await?;
    info!(
        project = %settings.routing.project_key,
        epic = settings.routing.epic_label(),
        mode = config.mode.as_str(),
        review_triggers = ?settings.triggers.review().collect::<Vec<_>>(),
        auto_triggers = ?settings.triggers.auto().collect::<Vec<_>>(),
        store = %drafts.path().display(),
        pending = pending.len(),
        "ticket bridge starting"
    );
    for id in &pending {
        info!(draft_id = %id, "pending draft");
    }

    let ctx = Arc::new(AppContext::new(
        settings,
        slack.clone(),
        slack.clone(),
        language_model,
        issue_tracker,
        drafts,
    ));

    SocketModeRunner::new(slack, ctx, config.reconnect_delay())
        .run()
        .await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
