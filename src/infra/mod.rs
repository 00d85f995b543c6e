pub mod jira;
pub mod llm;
pub mod slack;
pub mod socket;
