//! In-memory service doubles shared by the workflow and handler tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use crate::config::{ServiceMode, TriggerRoutes};
use crate::context::{AppContext, PipelineSettings};
use crate::domain::conversation::{AttachmentDescriptor, ThreadMessage};
use crate::domain::draft::{DraftId, DraftRecord, MessageRef};
use crate::domain::ticket::{CreatedIssue, IssueRouting, IssueType, Priority, TicketDraft};
use crate::error::{AppError, AppResult};
use crate::render::blocks::{ModalView, OutboundMessage};
use crate::services::{
    ChatService, DraftStore, FileSource, GenerationRequest, IssueTrackerService,
    LanguageModelService,
};
use crate::store::JsonFileDraftStore;
use crate::workflow::synthesize::ModelChoice;

#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    AddReaction(MessageRef, String),
    RemoveReaction(MessageRef, String),
    Post(String, OutboundMessage),
    Update(MessageRef, OutboundMessage),
    Ephemeral { channel: String, user: String, text: String },
    OpenView(String, ModalView),
}

#[derive(Default)]
struct ChatState {
    calls: Vec<ChatCall>,
    thread: Vec<ThreadMessage>,
    user_names: HashMap<String, String>,
    user_lookups: Vec<String>,
    thread_limits: Vec<usize>,
    posted: Vec<MessageRef>,
    fail_channel_lookup: bool,
    fail_posts: bool,
    fail_updates: bool,
    consume_on_post: Option<(Arc<dyn DraftStore>, DraftId)>,
}

/// Records every outbound call; posts answer with synthetic message refs.
#[derive(Default)]
pub struct RecordingChat {
    state: Mutex<ChatState>,
}

impl RecordingChat {
    fn with_state<T>(&self, f: impl FnOnce(&mut ChatState) -> T) -> T {
        f(&mut self.state.lock().expect("chat state"))
    }

    pub fn set_thread(&self, messages: Vec<ThreadMessage>) {
        self.with_state(|state| state.thread = messages);
    }

    pub fn set_user_name(&self, user: &str, name: &str) {
        self.with_state(|state| {
            state.user_names.insert(user.to_string(), name.to_string());
        });
    }

    pub fn fail_channel_lookup(&self) {
        self.with_state(|state| state.fail_channel_lookup = true);
    }

    pub fn fail_posts(&self) {
        self.with_state(|state| state.fail_posts = true);
    }

    pub fn fail_updates(&self) {
        self.with_state(|state| state.fail_updates = true);
    }

    /// The next successful post pops `id` from `drafts` before returning, the
    /// way a fast button click would.
    pub fn consume_draft_on_next_post(&self, drafts: Arc<dyn DraftStore>, id: DraftId) {
        self.with_state(|state| state.consume_on_post = Some((drafts, id)));
    }

    pub fn user_lookups(&self) -> Vec<String> {
        self.with_state(|state| state.user_lookups.clone())
    }

    pub fn thread_limits(&self) -> Vec<usize> {
        self.with_state(|state| state.thread_limits.clone())
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.with_state(|state| state.calls.clone())
    }

    pub fn posts(&self) -> Vec<(String, OutboundMessage)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Post(channel, message) => Some((channel, message)),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(MessageRef, OutboundMessage)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Update(target, message) => Some((target, message)),
                _ => None,
            })
            .collect()
    }

    pub fn views(&self) -> Vec<(String, ModalView)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::OpenView(trigger_id, view) => Some((trigger_id, view)),
                _ => None,
            })
            .collect()
    }

    pub fn ephemerals(&self) -> Vec<(String, String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Ephemeral {
                    channel,
                    user,
                    text,
                } => Some((channel, user, text)),
                _ => None,
            })
            .collect()
    }

    /// Reference returned for the `index`-th successful post.
    pub fn message_ref_of(&self, index: usize) -> MessageRef {
        self.with_state(|state| state.posted[index].clone())
    }
}

#[async_trait]
impl ChatService for RecordingChat {
    async fn add_reaction(&self, target: &MessageRef, name: &str) -> AppResult<()> {
        self.with_state(|state| {
            state
                .calls
                .push(ChatCall::AddReaction(target.clone(), name.to_string()))
        });
        Ok(())
    }

    async fn remove_reaction(&self, target: &MessageRef, name: &str) -> AppResult<()> {
        self.with_state(|state| {
            state
                .calls
                .push(ChatCall::RemoveReaction(target.clone(), name.to_string()))
        });
        Ok(())
    }

    async fn channel_name(&self, _channel: &str) -> AppResult<String> {
        self.with_state(|state| {
            if state.fail_channel_lookup {
                Err(AppError::Chat("channel_not_found".to_string()))
            } else {
                Ok("support".to_string())
            }
        })
    }

    async fn thread_replies(
        &self,
        _channel: &str,
        _ts: &str,
        limit: usize,
    ) -> AppResult<Vec<ThreadMessage>> {
        self.with_state(|state| {
            state.thread_limits.push(limit);
            Ok(state.thread.iter().take(limit).cloned().collect())
        })
    }

    async fn user_display_name(&self, user: &str) -> AppResult<String> {
        self.with_state(|state| {
            state.user_lookups.push(user.to_string());
            state
                .user_names
                .get(user)
                .cloned()
                .ok_or_else(|| AppError::Chat("user_not_found".to_string()))
        })
    }

    async fn permalink(&self, channel: &str, ts: &str) -> AppResult<String> {
        Ok(format!("https://chat.example/{channel}/{ts}"))
    }

    async fn post_message(
        &self,
        channel: &str,
        message: &OutboundMessage,
    ) -> AppResult<MessageRef> {
        let posted = self.with_state(|state| {
            if state.fail_posts {
                return Err(AppError::Chat("channel_not_found".to_string()));
            }
            state
                .calls
                .push(ChatCall::Post(channel.to_string(), message.clone()));
            let posted = MessageRef::new(
                &format!("D{channel}"),
                &format!("9000.{}", state.posted.len() + 1),
            );
            state.posted.push(posted.clone());
            Ok(posted)
        })?;
        let consume = self.with_state(|state| state.consume_on_post.take());
        if let Some((drafts, id)) = consume {
            drafts.pop_and_delete(&id).await?;
        }
        Ok(posted)
    }

    async fn update_message(
        &self,
        target: &MessageRef,
        message: &OutboundMessage,
    ) -> AppResult<()> {
        self.with_state(|state| {
            if state.fail_updates {
                return Err(AppError::Chat("message_not_found".to_string()));
            }
            state
                .calls
                .push(ChatCall::Update(target.clone(), message.clone()));
            Ok(())
        })
    }

    async fn post_ephemeral(&self, channel: &str, user: &str, text: &str) -> AppResult<()> {
        self.with_state(|state| {
            state.calls.push(ChatCall::Ephemeral {
                channel: channel.to_string(),
                user: user.to_string(),
                text: text.to_string(),
            })
        });
        Ok(())
    }

    async fn open_view(&self, trigger_id: &str, view: &ModalView) -> AppResult<()> {
        self.with_state(|state| {
            state
                .calls
                .push(ChatCall::OpenView(trigger_id.to_string(), view.clone()))
        });
        Ok(())
    }
}

/// Returns one canned reply and records every request.
#[derive(Default)]
pub struct ScriptedModel {
    reply: Mutex<String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        let model = Self::default();
        model.reply(reply);
        model
    }

    pub fn reply(&self, reply: &str) {
        *self.reply.lock().expect("reply") = reply.to_string();
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("requests").clone()
    }
}

#[async_trait]
impl LanguageModelService for ScriptedModel {
    async fn generate_json(&self, request: &GenerationRequest) -> AppResult<String> {
        self.requests.lock().expect("requests").push(request.clone());
        Ok(self.reply.lock().expect("reply").clone())
    }
}

#[derive(Debug, Clone)]
pub struct CreateCall {
    pub ticket: TicketDraft,
    pub origin_link: String,
    pub routing: IssueRouting,
}

/// Tracker that hands out `GOD-42` and can be told to reject work.
#[derive(Default)]
pub struct RecordingTracker {
    created: Mutex<Vec<CreateCall>>,
    uploaded: Mutex<Vec<String>>,
    create_error: Mutex<Option<String>>,
    failing_uploads: Mutex<Vec<String>>,
}

impl RecordingTracker {
    pub fn reject_creates(&self, message: &str) {
        *self.create_error.lock().expect("create error") = Some(message.to_string());
    }

    pub fn fail_upload_of(&self, name: &str) {
        self.failing_uploads
            .lock()
            .expect("failing uploads")
            .push(name.to_string());
    }

    pub fn created(&self) -> Vec<CreateCall> {
        self.created.lock().expect("created").clone()
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().expect("uploaded").clone()
    }
}

#[async_trait]
impl IssueTrackerService for RecordingTracker {
    async fn create_issue(
        &self,
        ticket: &TicketDraft,
        origin_link: &str,
        routing: &IssueRouting,
    ) -> AppResult<CreatedIssue> {
        if let Some(message) = self.create_error.lock().expect("create error").clone() {
            return Err(AppError::IssueTracker(message));
        }
        self.created.lock().expect("created").push(CreateCall {
            ticket: ticket.clone(),
            origin_link: origin_link.to_string(),
            routing: routing.clone(),
        });
        Ok(CreatedIssue {
            key: "GOD-42".to_string(),
            url: "https://jira.example/browse/GOD-42".to_string(),
        })
    }

    async fn upload_attachment(
        &self,
        _issue_key: &str,
        file_name: &str,
        path: &Path,
    ) -> AppResult<()> {
        if !path.exists() {
            return Err(AppError::Attachment(format!("{file_name} was not downloaded")));
        }
        let failing = self.failing_uploads.lock().expect("failing uploads");
        if failing.iter().any(|name| name == file_name) {
            return Err(AppError::IssueTracker("Jira API error: 413".to_string()));
        }
        self.uploaded
            .lock()
            .expect("uploaded")
            .push(file_name.to_string());
        Ok(())
    }
}

/// Writes a fixed payload for every download.
pub struct StaticFiles;

#[async_trait]
impl FileSource for StaticFiles {
    async fn download_to(&self, _url: &str, destination: &Path) -> AppResult<u64> {
        tokio::fs::write(destination, b"file-bytes").await?;
        Ok(10)
    }
}

pub fn hosted_file(name: &str) -> AttachmentDescriptor {
    AttachmentDescriptor {
        name: name.to_string(),
        source_url: Some(format!("https://files.example/{name}")),
        transfer_mode: Some("hosted".to_string()),
        mime_type: None,
    }
}

pub fn test_settings() -> PipelineSettings {
    PipelineSettings {
        routing: IssueRouting::new("GOD", Some("GOD-26345")),
        review_model: ModelChoice {
            model: "review-model".to_string(),
            temperature: 0.3,
        },
        auto_model: ModelChoice {
            model: "auto-model".to_string(),
            temperature: 0.3,
        },
        triggers: TriggerRoutes::new(
            ServiceMode::Both,
            &["ticket".to_string(), "jira".to_string()],
            &["uiux".to_string()],
        )
        .expect("trigger routes"),
    }
}

/// Fully wired context over the doubles above and a store in a temp dir.
pub struct Harness {
    pub chat: Arc<RecordingChat>,
    pub model: Arc<ScriptedModel>,
    pub tracker: Arc<RecordingTracker>,
    pub drafts: Arc<JsonFileDraftStore>,
    ctx: Arc<AppContext>,
    _dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let chat = Arc::new(RecordingChat::default());
        let model = Arc::new(ScriptedModel::default());
        let tracker = Arc::new(RecordingTracker::default());
        let drafts = Arc::new(JsonFileDraftStore::open(dir.path()).expect("store"));
        let ctx = Arc::new(AppContext::new(
            test_settings(),
            chat.clone(),
            Arc::new(StaticFiles),
            model.clone(),
            tracker.clone(),
            drafts.clone(),
        ));
        Self {
            chat,
            model,
            tracker,
            drafts,
            ctx,
            _dir: dir,
        }
    }

    pub fn ctx(&self) -> Arc<AppContext> {
        Arc::clone(&self.ctx)
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.ctx.settings
    }

    /// Stores a draft as the draft pipeline would leave it.
    pub async fn seed_draft(
        &self,
        channel: &str,
        ts: &str,
        attachments: Vec<AttachmentDescriptor>,
    ) -> DraftRecord {
        let record = DraftRecord {
            id: DraftId::new(channel, ts),
            ticket: TicketDraft {
                title: "Login fails on SSO".to_string(),
                description: "h2. Context".to_string(),
                issue_type: IssueType::Bug,
                priority: Priority::NeedsPriority,
                labels: vec!["auth".to_string()],
            },
            origin_link: format!("https://chat.example/{channel}/{ts}"),
            requesting_user_id: "U1".to_string(),
            attachments,
            created_at: Utc::now(),
            status_message: Some(MessageRef::new("DU1", "9000.0")),
        };
        self.drafts.put(&record).await.expect("seed draft");
        record
    }
}
