use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("chat platform error: {0}")]
    Chat(String),
    #[error("language model error: {0}")]
    LanguageModel(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("draft store error: {0}")]
    Store(String),
    #[error("draft {0} was not readable after it was stored")]
    StoreInconsistency(String),
    #[error("attachment error: {0}")]
    Attachment(String),
    #[error("unrecognized payload: {0}")]
    Payload(String),
    #[error("invalid draft transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error("background task panicked: {0}")]
    TaskPanicked(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;
