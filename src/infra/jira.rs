use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    multipart::{Form, Part},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::domain::ticket::{CreatedIssue, IssueRouting, TicketDraft};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;
use crate::text::truncate_chars;

const CREATE_TIMEOUT: Duration = Duration::from_secs(30);
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const ERROR_BODY_LIMIT: usize = 200;

pub struct JiraClient {
    http: Client,
    base_url: String,
    email: String,
    token: String,
    epic_link_field: String,
}

impl JiraClient {
    pub fn new(base_url: &str, email: &str, token: &str, epic_link_field: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            token: token.to_string(),
            epic_link_field: epic_link_field.to_string(),
        }
    }

    fn auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.email, self.token);
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn issue_endpoint(&self) -> String {
        format!("{}/rest/api/2/issue", self.base_url)
    }

    fn attachments_endpoint(&self, key: &str) -> String {
        format!("{}/rest/api/2/issue/{key}/attachments", self.base_url)
    }

    fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.base_url)
    }
}

pub fn description_with_origin(description: &str, origin_link: &str) -> String {
    format!("{description}\n\n----\n[View Slack conversation|{origin_link}]")
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn create_issue(
        &self,
        ticket: &TicketDraft,
        origin_link: &str,
        routing: &IssueRouting,
    ) -> AppResult<CreatedIssue> {
        if routing.project_key.is_empty() {
            return Err(AppError::IssueTracker(
                "project key must not be empty".to_string(),
            ));
        }

        let request_body = JiraCreateIssueRequest::new(
            ticket,
            &description_with_origin(&ticket.description, origin_link),
            routing,
            &self.epic_link_field,
        );
        info!(
            project = %routing.project_key,
            epic = routing.epic_label(),
            "creating issue"
        );

        let response = self
            .http
            .post(self.issue_endpoint())
            .timeout(CREATE_TIMEOUT)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            error!(status = status.as_u16(), body = %body, "issue creation rejected");
            return Err(AppError::IssueTracker(format!(
                "Jira API error: {} - {}",
                status.as_u16(),
                truncate_chars(&body, ERROR_BODY_LIMIT)
            )));
        }

        let payload: JiraCreateIssueResponse = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse Jira response: {err}"))
        })?;

        info!(key = %payload.key, "created issue");
        Ok(CreatedIssue {
            url: self.browse_url(&payload.key),
            key: payload.key,
        })
    }

    async fn upload_attachment(
        &self,
        issue_key: &str,
        file_name: &str,
        path: &Path,
    ) -> AppResult<()> {
        let contents = tokio::fs::read(path).await?;
        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name.to_string()));

        let response = self
            .http
            .post(self.attachments_endpoint(issue_key))
            .timeout(UPLOAD_TIMEOUT)
            .header(AUTHORIZATION, self.auth_header())
            .header("X-Atlassian-Token", "no-check")
            .multipart(form)
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to upload {file_name}: {err}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::IssueTracker(format!(
                "upload of {file_name} responded with {}",
                status.as_u16()
            )));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JiraCreateIssueRequest {
    fields: JiraCreateIssueFields,
}

impl JiraCreateIssueRequest {
    fn new(
        ticket: &TicketDraft,
        description: &str,
        routing: &IssueRouting,
        epic_link_field: &str,
    ) -> Self {
        let mut extra = BTreeMap::new();
        if let Some(epic) = &routing.epic_key {
            extra.insert(epic_link_field.to_string(), epic.clone());
        }
        Self {
            fields: JiraCreateIssueFields {
                project: JiraProject {
                    key: routing.project_key.clone(),
                },
                summary: ticket.title.clone(),
                description: description.to_string(),
                issuetype: JiraNamed {
                    name: ticket.issue_type.as_str().to_string(),
                },
                priority: JiraNamed {
                    name: ticket.priority.tracker_name().to_string(),
                },
                labels: ticket.labels.clone(),
                extra,
            },
        }
    }
}

#[derive(Serialize)]
struct JiraCreateIssueFields {
    project: JiraProject,
    summary: String,
    description: String,
    issuetype: JiraNamed,
    priority: JiraNamed,
    labels: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct JiraProject {
    key: String,
}

#[derive(Serialize)]
struct JiraNamed {
    name: String,
}

#[derive(Deserialize)]
struct JiraCreateIssueResponse {
    key: String,
}
