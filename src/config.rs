use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::domain::lifecycle::PipelineMode;
use crate::domain::ticket::IssueRouting;
use crate::error::{AppError, AppResult};
use crate::workflow::synthesize::ModelChoice;

/// Which pipelines answer trigger reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceMode {
    Review,
    Auto,
    Both,
}

impl ServiceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceMode::Review => "review",
            ServiceMode::Auto => "auto",
            ServiceMode::Both => "both",
        }
    }
}

/// Service settings, read from the environment (or a `.env` file).
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ticket-bridge",
    version,
    about = "Turns reacted Slack threads into Jira tickets"
)]
pub struct AppConfig {
    #[arg(long, env = "JIRA_BASE_URL")]
    pub jira_base_url: String,
    #[arg(long, env = "JIRA_EMAIL")]
    pub jira_email: String,
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    pub jira_api_token: String,
    /// Custom field holding the epic link.
    #[arg(long, env = "JIRA_EPIC_LINK_FIELD", default_value = "customfield_10014")]
    pub jira_epic_link_field: String,
    #[arg(long, env = "DEFAULT_PROJECT", default_value = "GOD")]
    pub default_project: String,
    /// Empty means new issues get no epic.
    #[arg(long, env = "DEFAULT_EPIC", default_value = "GOD-26345")]
    pub default_epic: String,

    #[arg(long, env = "SLACK_BOT_TOKEN", hide_env_values = true)]
    pub slack_bot_token: String,
    #[arg(long, env = "SLACK_APP_TOKEN", hide_env_values = true)]
    pub slack_app_token: String,
    #[arg(long, env = "SLACK_API_BASE", default_value = "https://slack.com/api")]
    pub slack_api_base: String,
    #[arg(long, env = "SLACK_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub slack_request_timeout_secs: u64,
    #[arg(long, env = "RECONNECT_DELAY_SECS", default_value_t = 5)]
    pub reconnect_delay_secs: u64,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,
    #[arg(
        long,
        env = "GEMINI_API_BASE",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub gemini_api_base: String,
    /// Model used for review drafts.
    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    pub gemini_model: String,
    /// Model used for auto-created tickets.
    #[arg(long, env = "GEMINI_AUTO_MODEL", default_value = "gemini-3-pro-preview")]
    pub gemini_auto_model: String,
    #[arg(long, env = "GEMINI_TEMPERATURE", default_value_t = 0.3)]
    pub gemini_temperature: f32,

    #[arg(long, env = "DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,
    #[arg(long, env = "TICKET_BOT_MODE", value_enum, default_value_t = ServiceMode::Both)]
    pub mode: ServiceMode,
    #[arg(
        long,
        env = "REVIEW_TRIGGERS",
        value_delimiter = ',',
        default_value = "ticket,jira,memo"
    )]
    pub review_triggers: Vec<String>,
    #[arg(long, env = "AUTO_TRIGGERS", value_delimiter = ',', default_value = "uiux")]
    pub auto_triggers: Vec<String>,
}

impl AppConfig {
    /// Loads `.env` when present, then parses and validates the environment.
    pub fn load() -> AppResult<Self> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(err) => {
                return Err(AppError::Configuration(format!("failed to read .env: {err}")));
            }
        }
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        let required = [
            ("JIRA_BASE_URL", &self.jira_base_url),
            ("JIRA_EMAIL", &self.jira_email),
            ("JIRA_API_TOKEN", &self.jira_api_token),
            ("DEFAULT_PROJECT", &self.default_project),
            ("SLACK_BOT_TOKEN", &self.slack_bot_token),
            ("SLACK_APP_TOKEN", &self.slack_app_token),
            ("GOOGLE_API_KEY", &self.google_api_key),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Configuration(format!("{name} must not be empty")));
            }
        }
        if !(0.0..=2.0).contains(&self.gemini_temperature) {
            return Err(AppError::Configuration(format!(
                "GEMINI_TEMPERATURE must be between 0 and 2, got {}",
                self.gemini_temperature
            )));
        }
        self.trigger_routes().map(|_| ())
    }

    pub fn default_routing(&self) -> IssueRouting {
        IssueRouting::new(&self.default_project, Some(&self.default_epic))
    }

    pub fn trigger_routes(&self) -> AppResult<TriggerRoutes> {
        TriggerRoutes::new(self.mode, &self.review_triggers, &self.auto_triggers)
    }

    pub fn review_model(&self) -> ModelChoice {
        ModelChoice {
            model: self.gemini_model.clone(),
            temperature: self.gemini_temperature,
        }
    }

    pub fn auto_model(&self) -> ModelChoice {
        ModelChoice {
            model: self.gemini_auto_model.clone(),
            temperature: self.gemini_temperature,
        }
    }

    pub fn slack_request_timeout(&self) -> Duration {
        Duration::from_secs(self.slack_request_timeout_secs.max(1))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

/// Maps trigger emoji names to the pipeline they start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerRoutes {
    review: BTreeSet<String>,
    auto: BTreeSet<String>,
}

impl TriggerRoutes {
    pub fn new(mode: ServiceMode, review: &[String], auto: &[String]) -> AppResult<Self> {
        let review = if mode == ServiceMode::Auto {
            BTreeSet::new()
        } else {
            normalize(review)
        };
        let auto = if mode == ServiceMode::Review {
            BTreeSet::new()
        } else {
            normalize(auto)
        };

        if let Some(shared) = review.intersection(&auto).next() {
            return Err(AppError::Configuration(format!(
                "reaction '{shared}' is configured for both review and auto mode"
            )));
        }
        if review.is_empty() && auto.is_empty() {
            return Err(AppError::Configuration(
                "no trigger reactions configured".to_string(),
            ));
        }
        Ok(Self { review, auto })
    }

    pub fn mode_for(&self, reaction: &str) -> Option<PipelineMode> {
        if self.review.contains(reaction) {
            Some(PipelineMode::Review)
        } else if self.auto.contains(reaction) {
            Some(PipelineMode::Auto)
        } else {
            None
        }
    }

    pub fn review(&self) -> impl Iterator<Item = &str> {
        self.review.iter().map(String::as_str)
    }

    pub fn auto(&self) -> impl Iterator<Item = &str> {
        self.auto.iter().map(String::as_str)
    }
}

fn normalize(names: &[String]) -> BTreeSet<String> {
    names
        .iter()
        .map(|name| name.trim().trim_matches(':').to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
