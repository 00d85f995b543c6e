use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::domain::ticket::{IssueType, Priority, TITLE_MAX_CHARS, TicketDraft, TicketSummary};
use crate::error::{AppError, AppResult};
use crate::services::{GenerationRequest, LanguageModelService};
use crate::text::truncate_chars;

const REVIEW_INSTRUCTION: &str = r#"You convert Slack conversations into Jira tickets.

Return JSON with these fields:
{
  "title": "Clear, actionable title under 80 chars",
  "description": "Jira-formatted description using h2. for headers, * for bullets",
  "issue_type": "Story" | "Bug" | "Task",
  "priority": "Needs Priority",
  "labels": ["relevant", "labels"]
}

Guidelines:
- Default to "Story" if unsure
- Bug: Something is broken or not working as expected
- Story: New feature or enhancement request
- Task: General work item, maintenance, or documentation
- Use Jira markup: h2. for headers, * for bullets, {code} for code blocks"#;

const AUTO_INSTRUCTION: &str = r#"You convert Slack conversations into Jira tickets.

Return JSON with these fields:
{
  "title": "Clear, actionable title under 80 chars",
  "description": "Jira-formatted description using h2. for headers, * for bullets"
}

Guidelines:
- Title should be a clear summary of what needs to be done
- Description should include context, requirements, and any relevant details
- Use Jira markup: h2. for headers, * for bullets, {code} for code blocks
- Extract key information from the conversation"#;

/// Model name and sampling temperature for one synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelChoice {
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeneratedDraft {
    title: String,
    description: String,
    #[serde(default)]
    issue_type: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

fn prompt(channel_name: &str, transcript: &str) -> String {
    format!("Channel: #{channel_name}\n\nConversation:\n{transcript}")
}

async fn generate<T: DeserializeOwned>(
    model: &dyn LanguageModelService,
    choice: &ModelChoice,
    instruction: &str,
    channel_name: &str,
    transcript: &str,
) -> AppResult<T> {
    let request = GenerationRequest {
        model: choice.model.clone(),
        system_instruction: instruction.to_string(),
        contents: prompt(channel_name, transcript),
        temperature: choice.temperature,
    };
    let raw = model.generate_json(&request).await?;
    serde_json::from_str(raw.trim()).map_err(|err| {
        AppError::LanguageModel(format!("model returned malformed ticket JSON: {err}"))
    })
}

fn clean_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::LanguageModel(
            "model returned an empty title".to_string(),
        ));
    }
    Ok(truncate_chars(title, TITLE_MAX_CHARS).trim_end().to_string())
}

/// Draft for the review flow. Priority is always reset to "Needs Priority";
/// an unknown issue type falls back to Story.
pub async fn review_draft(
    model: &dyn LanguageModelService,
    choice: &ModelChoice,
    channel_name: &str,
    transcript: &str,
) -> AppResult<TicketDraft> {
    let generated: GeneratedDraft =
        generate(model, choice, REVIEW_INSTRUCTION, channel_name, transcript).await?;

    let mut labels: Vec<String> = Vec::new();
    for label in generated.labels {
        let label = label.trim();
        if !label.is_empty() && !labels.iter().any(|existing| existing == label) {
            labels.push(label.to_string());
        }
    }

    let ticket = TicketDraft {
        title: clean_title(&generated.title)?,
        description: generated.description,
        issue_type: generated
            .issue_type
            .as_deref()
            .and_then(IssueType::from_label)
            .unwrap_or(IssueType::Story),
        priority: Priority::NeedsPriority,
        labels,
    };
    info!(title = truncate_chars(&ticket.title, 50), "generated ticket draft");
    Ok(ticket)
}

/// Title and description only; the auto flow fixes everything else.
pub async fn auto_summary(
    model: &dyn LanguageModelService,
    choice: &ModelChoice,
    channel_name: &str,
    transcript: &str,
) -> AppResult<TicketSummary> {
    let generated: TicketSummary =
        generate(model, choice, AUTO_INSTRUCTION, channel_name, transcript).await?;
    let summary = TicketSummary {
        title: clean_title(&generated.title)?,
        description: generated.description,
    };
    info!(title = truncate_chars(&summary.title, 50), "generated ticket summary");
    Ok(summary)
}
