use std::fmt;

use serde::{Deserialize, Serialize};

pub const TITLE_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueType {
    Story,
    Bug,
    Task,
}

impl IssueType {
    pub const ALL: [IssueType; 3] = [IssueType::Story, IssueType::Bug, IssueType::Task];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Story => "Story",
            IssueType::Bug => "Bug",
            IssueType::Task => "Task",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "story" => Some(IssueType::Story),
            "bug" => Some(IssueType::Bug),
            "task" => Some(IssueType::Task),
            _ => None,
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-facing priority label. Anything outside the known set is kept
/// verbatim and handed to the tracker unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    NeedsPriority,
    Highest,
    High,
    Medium,
    Low,
    Other(String),
}

impl Priority {
    pub const KNOWN: [Priority; 5] = [
        Priority::NeedsPriority,
        Priority::Highest,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    pub fn label(&self) -> &str {
        match self {
            Priority::NeedsPriority => "Needs Priority",
            Priority::Highest => "Highest",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Other(value) => value,
        }
    }

    pub fn from_label(value: &str) -> Self {
        match value {
            "Needs Priority" => Priority::NeedsPriority,
            "Highest" => Priority::Highest,
            "High" => Priority::High,
            "Medium" => Priority::Medium,
            "Low" => Priority::Low,
            other => Priority::Other(other.to_string()),
        }
    }

    /// Priority name as configured in the tracker.
    pub fn tracker_name(&self) -> &str {
        match self {
            Priority::NeedsPriority => "Needs Priority",
            Priority::Highest => "P0 - Critical / Blocker",
            Priority::High => "P1 - High Priority",
            Priority::Medium => "P2 - Medium Priority",
            Priority::Low => "P3 - Low Priority",
            Priority::Other(value) => value,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Priority::from_label(&value)
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub issue_type: IssueType,
    pub priority: Priority,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Title and description only; auto mode fills in the rest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TicketSummary {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    pub key: String,
    pub url: String,
}

/// Where a new issue lands in the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRouting {
    pub project_key: String,
    pub epic_key: Option<String>,
}

impl IssueRouting {
    pub fn new(project_key: &str, epic_key: Option<&str>) -> Self {
        Self {
            project_key: project_key.trim().to_string(),
            epic_key: epic_key
                .map(str::trim)
                .filter(|epic| !epic.is_empty())
                .map(str::to_string),
        }
    }

    pub fn epic_label(&self) -> &str {
        self.epic_key.as_deref().unwrap_or("None")
    }
}
