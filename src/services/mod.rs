pub mod chat;
pub mod draft_store;
pub mod issue_tracker;
pub mod language_model;

pub use chat::{ChatService, FileSource};
pub use draft_store::DraftStore;
pub use issue_tracker::IssueTrackerService;
pub use language_model::{GenerationRequest, LanguageModelService};
